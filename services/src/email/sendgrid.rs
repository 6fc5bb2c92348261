use super::{EmailError, EmailSender, OutgoingEmail};
use async_trait::async_trait;
use serde_json::{json, Value};
use util::config::AppConfig;

pub const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

/// Transactional-API backend: SendGrid v3 `mail/send`.
#[derive(Clone)]
pub struct SendGridSender {
    client: reqwest::Client,
    api_key: String,
    from_email: String,
    from_name: String,
    endpoint: String,
}

impl SendGridSender {
    pub fn new(
        api_key: impl Into<String>,
        from_email: impl Into<String>,
        from_name: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            from_email: from_email.into(),
            from_name: from_name.into(),
            endpoint: SENDGRID_ENDPOINT.to_string(),
        }
    }

    pub fn from_config() -> Self {
        let cfg = AppConfig::global();
        Self::new(
            cfg.sendgrid_api_key.clone(),
            cfg.email_from.clone(),
            cfg.email_from_name.clone(),
        )
    }

    /// Points the sender at another API host (e.g. a local mock).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn payload(&self, email: &OutgoingEmail) -> Value {
        json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.from_email, "name": self.from_name },
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": email.text },
                { "type": "text/html", "value": email.html },
            ],
        })
    }
}

#[async_trait]
impl EmailSender for SendGridSender {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        if self.api_key.is_empty() {
            return Err(EmailError::NotConfigured("SENDGRID_API_KEY is empty"));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(email))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(EmailError::Rejected(status.as_u16()))
        }
    }
}
