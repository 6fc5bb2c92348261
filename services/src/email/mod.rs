//! Email service module for transactional messages.
//!
//! [`EmailService`] renders templates for the deployment environment it was
//! built for and hands the finished [`OutgoingEmail`] to an [`EmailSender`]
//! backend. Two backends ship with the crate:
//!
//! - [`sendgrid::SendGridSender`]: SendGrid v3 HTTP API (`reqwest`)
//! - [`smtp::SmtpSender`]: any SMTP relay (`lettre`)
//!
//! Delivery is best effort: [`EmailService::send_verify_email`] reports the
//! outcome as a `bool` and never returns an error.

pub mod sendgrid;
pub mod smtp;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use util::config::Environment;

pub use sendgrid::SendGridSender;
pub use smtp::SmtpSender;

/// A fully rendered message, ready for a delivery backend.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("http delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected message with status {0}")]
    Rejected(u16),

    #[error("sender is not configured: {0}")]
    NotConfigured(&'static str),
}

/// Delivery backend capability.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// Templated email delivery bound to one environment and one backend.
pub struct EmailService {
    env: Environment,
    public_url: String,
    sender: Arc<dyn EmailSender>,
}

impl EmailService {
    pub fn new(env: Environment, public_url: impl Into<String>, sender: Arc<dyn EmailSender>) -> Self {
        Self {
            env,
            public_url: public_url.into(),
            sender,
        }
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!(
            "{}/api/users/verify/{}",
            self.public_url.trim_end_matches('/'),
            token
        )
    }

    fn subject(&self, base: &str) -> String {
        if self.env.is_production() {
            base.to_string()
        } else {
            format!("[{}] {}", self.env, base)
        }
    }

    /// Renders the verification email for `name` and `token`.
    ///
    /// `name` is user supplied and is HTML-escaped in the HTML part.
    pub fn verify_email(&self, to: &str, name: &str, token: &str) -> OutgoingEmail {
        let link = self.verification_link(token);
        let html_name = html_escape::encode_safe(name);

        OutgoingEmail {
            to: to.to_string(),
            subject: self.subject("Confirm your email"),
            text: format!(
                "Hello, {name}!\n\n\
                Please confirm your email address by opening the link below:\n\n\
                {link}\n\n\
                If you did not create an account, you can ignore this email."
            ),
            html: format!(
                r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; color: #333;">
    <h2>Hello, {html_name}!</h2>
    <p>Please confirm your email address to finish setting up your account.</p>
    <p><a href="{link}" style="display:inline-block;padding:10px 20px;background:#007bff;color:#fff;text-decoration:none;border-radius:5px;">Confirm email</a></p>
    <p>If you did not create an account, you can ignore this email.</p>
  </body>
</html>"#
            ),
        }
    }

    /// Sends the verification email; `true` when the backend accepted it.
    pub async fn send_verify_email(&self, email: &str, name: &str, token: &str) -> bool {
        let message = self.verify_email(email, name, token);

        match self.sender.send(&message).await {
            Ok(()) => {
                tracing::info!(backend = self.sender.name(), to = email, "Verification email sent");
                true
            }
            Err(e) => {
                tracing::error!(
                    backend = self.sender.name(),
                    to = email,
                    error = %e,
                    "Failed to send verification email"
                );
                false
            }
        }
    }
}
