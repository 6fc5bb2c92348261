pub mod m202510010001_create_users;
