//! Status-change notifications.

use chrono::{SecondsFormat, Utc};

use crate::config::MailCredentials;
use crate::models::{NotificationKind, ProductConfig};
use crate::services::mailer::Mailer;

/// A rendered notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub body: String,
}

/// Formats and sends status-change emails on a best-effort basis.
pub struct Notifier<M> {
    mailer: M,
    from: String,
    to: String,
    product: ProductConfig,
}

impl<M: Mailer> Notifier<M> {
    pub fn new(mailer: M, credentials: &MailCredentials, product: ProductConfig) -> Self {
        Self {
            mailer,
            from: credentials.sender.clone(),
            to: credentials.recipient.clone(),
            product,
        }
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Render the fixed template for `kind`.
    pub fn render(&self, kind: NotificationKind) -> Email {
        let label = &self.product.label;
        let url = &self.product.url;
        let (subject, lead) = match kind {
            NotificationKind::BackInStock => (
                format!("{} IS NOW IN STOCK!", label.to_uppercase()),
                format!("The {label} is back in stock! Buy it now at: {url}"),
            ),
            NotificationKind::SoldOut => (
                format!("{} IS NOW SOLD OUT!", label.to_uppercase()),
                format!("The {label} is now sold out. It was last seen at: {url}"),
            ),
        };
        let checked_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        Email {
            subject,
            body: format!("{lead}\n\nChecked at {checked_at}"),
        }
    }

    /// Send the `kind` email. Failures are logged and swallowed.
    ///
    /// Returns whether the mail transport accepted the message.
    pub async fn notify(&self, kind: NotificationKind) -> bool {
        let email = self.render(kind);
        log::info!("Sending '{}' email to {}", kind, self.to);

        match self
            .mailer
            .send(&self.from, &self.to, &email.subject, &email.body)
            .await
        {
            Ok(()) => {
                log::info!("'{}' email sent", kind);
                true
            }
            Err(e) => {
                log::error!("Failed to send '{}' email: {}", kind, e);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{AppError, Result};

    /// Mailer that records every message and optionally fails.
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String, String, String)>>,
        pub fail: bool,
    }

    impl RecordingMailer {
        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub(crate) fn subjects(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(_, _, subject, _)| subject.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result<()> {
            self.sent.lock().unwrap().push((
                from.to_string(),
                to.to_string(),
                subject.to_string(),
                body.to_string(),
            ));
            if self.fail {
                return Err(AppError::mail("535 authentication failed"));
            }
            Ok(())
        }
    }

    pub(crate) fn credentials() -> MailCredentials {
        MailCredentials {
            sender: "monitor@example.com".into(),
            password: "secret".into(),
            recipient: "operator@example.com".into(),
        }
    }

    pub(crate) fn notifier(mailer: RecordingMailer) -> Notifier<RecordingMailer> {
        Notifier::new(mailer, &credentials(), ProductConfig::default())
    }

    #[test]
    fn test_render_back_in_stock() {
        let email = notifier(RecordingMailer::default()).render(NotificationKind::BackInStock);
        assert_eq!(email.subject, "AMUL PRODUCT IS NOW IN STOCK!");
        assert!(email.body.starts_with(
            "The Amul product is back in stock! Buy it now at: https://shop.amul.com/"
        ));
        assert!(email.body.contains("Checked at "));
    }

    #[test]
    fn test_render_sold_out() {
        let email = notifier(RecordingMailer::default()).render(NotificationKind::SoldOut);
        assert_eq!(email.subject, "AMUL PRODUCT IS NOW SOLD OUT!");
        assert!(email.body.contains("It was last seen at: https://shop.amul.com/"));
    }

    #[tokio::test]
    async fn test_notify_uses_sender_and_recipient() {
        let notifier = notifier(RecordingMailer::default());
        assert!(notifier.notify(NotificationKind::SoldOut).await);

        let sent = notifier.mailer().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "monitor@example.com");
        assert_eq!(sent[0].1, "operator@example.com");
    }

    #[tokio::test]
    async fn test_notify_swallows_send_failure() {
        let notifier = notifier(RecordingMailer::failing());
        assert!(!notifier.notify(NotificationKind::BackInStock).await);
        assert_eq!(notifier.mailer().subjects().len(), 1);
    }
}
