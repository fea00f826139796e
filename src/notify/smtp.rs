use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::Mailer;
use crate::config::SmtpConfig;

/// STARTTLS SMTP sender configured from the environment.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Check if a server and sender address are configured.
    pub fn is_enabled(&self) -> bool {
        self.config.server.is_some() && self.config.from_email.is_some()
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message> {
        let from_address = self
            .config
            .from_email
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("From address not configured"))?;
        let from: Mailbox = from_address.parse()?;
        let to: Mailbox = to.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let smtp_host = self
            .config
            .server
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("SMTP server not configured"))?;
        let email = self.build_message(to, subject, body)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)?
            .port(self.config.port)
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)));

        let mailer = if let (Some(username), Some(password)) =
            (&self.config.username, &self.config.password)
        {
            mailer.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer
        };

        mailer.build().send(email).await?;

        tracing::info!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}
