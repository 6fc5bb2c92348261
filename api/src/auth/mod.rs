pub mod extractors;
pub mod middleware;

pub use extractors::CurrentUser;
