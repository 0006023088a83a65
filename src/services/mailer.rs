//! Mail transport.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailCredentials;
use crate::error::{AppError, Result};
use crate::models::MailConfig;

/// Delivers a single plain-text email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// SMTP over implicit TLS, authenticated with the sender's credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig, credentials: &MailCredentials) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::config(format!("SMTP relay error: {e}")))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                credentials.sender.clone(),
                credentials.password.clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(
                from.parse::<Mailbox>()
                    .map_err(|e| AppError::mail(format!("invalid from address: {e}")))?,
            )
            .to(to
                .parse::<Mailbox>()
                .map_err(|e| AppError::mail(format!("invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::mail(format!("failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::mail(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> MailCredentials {
        MailCredentials {
            sender: "monitor@example.com".into(),
            password: "app-password".into(),
            recipient: "operator@example.com".into(),
        }
    }

    #[tokio::test]
    async fn test_smtp_mailer_construction() {
        let mailer = SmtpMailer::new(&MailConfig::default(), &credentials());
        assert!(mailer.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_address_is_mail_error() {
        let mailer = SmtpMailer::new(&MailConfig::default(), &credentials()).unwrap();
        let result = mailer
            .send("not an address", "operator@example.com", "subject", "body")
            .await;

        assert!(matches!(result, Err(AppError::Mail(_))));
    }
}
