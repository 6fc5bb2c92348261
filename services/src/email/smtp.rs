use super::{EmailError, EmailSender, OutgoingEmail};
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{authentication::Credentials, AsyncSmtpTransport},
    AsyncTransport, Message, Tokio1Executor,
};
use util::config::AppConfig;

/// SMTP backend over a STARTTLS relay.
///
/// Without a username the transport connects unauthenticated and in plain
/// text, which is only meant for local mail catchers.
#[derive(Clone)]
pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSender {
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        from: Mailbox,
    ) -> Result<Self, EmailError> {
        let transport = if username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(port)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
                .port(port)
                .credentials(Credentials::new(username.to_string(), password.to_string()))
                .build()
        };

        Ok(Self { transport, from })
    }

    pub fn from_config() -> Result<Self, EmailError> {
        let cfg = AppConfig::global();
        let from = mailbox(&cfg.email_from_name, &cfg.email_from)?;
        Self::new(
            &cfg.smtp_host,
            cfg.smtp_port,
            &cfg.smtp_username,
            &cfg.smtp_password,
            from,
        )
    }

    fn build(&self, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e: lettre::address::AddressError| EmailError::Address(e.to_string()))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| EmailError::Build(e.to_string()))
    }
}

/// `"Name <address>"` mailbox from separate display name and address.
pub fn mailbox(name: &str, address: &str) -> Result<Mailbox, EmailError> {
    let address = address
        .parse()
        .map_err(|e: lettre::address::AddressError| EmailError::Address(e.to_string()))?;
    Ok(Mailbox::new(Some(name.to_string()), address))
}

#[async_trait]
impl EmailSender for SmtpSender {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let message = self.build(email)?;
        self.transport.send(message).await?;
        Ok(())
    }
}
