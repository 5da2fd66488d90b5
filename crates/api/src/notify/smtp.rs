//! SMTP notifier backed by lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::Notifier;

/// SMTP relay configuration for activation-code delivery.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay hostname (e.g. `smtp.gmail.com`).
    pub host: String,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. `Lattice <noreply@example.com>`.
    pub from: String,
}

impl SmtpConfig {
    /// Load SMTP configuration from the environment.
    ///
    /// Returns `None` when `SMTP_HOST` is unset -- the service then runs
    /// with the log-only notifier.
    ///
    /// # Panics
    ///
    /// Panics if `SMTP_HOST` is set but any of `SMTP_USERNAME`,
    /// `SMTP_PASSWORD`, or `SMTP_FROM` is missing.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let username = std::env::var("SMTP_USERNAME")
            .expect("SMTP_USERNAME must be set when SMTP_HOST is set");
        let password = std::env::var("SMTP_PASSWORD")
            .expect("SMTP_PASSWORD must be set when SMTP_HOST is set");
        let from = std::env::var("SMTP_FROM").expect("SMTP_FROM must be set when SMTP_HOST is set");
        Some(Self {
            host,
            username,
            password,
            from,
        })
    }
}

/// Sends activation codes through an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a notifier from config. Fails on an unparseable relay host or
    /// sender mailbox.
    pub fn new(config: &SmtpConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        let from: Mailbox = config.from.parse()?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, recipient: &str, code: &str) {
        let mailbox: Mailbox = match recipient.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                tracing::warn!(recipient, error = %err, "Unparseable recipient address; activation code not sent");
                return;
            }
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(mailbox)
            .subject("Your database activation code")
            .body(format!(
                "Your activation code is {code}. It expires in 30 minutes."
            ));

        let message = match message {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(recipient, error = %err, "Could not build activation email");
                return;
            }
        };

        if let Err(err) = self.transport.send(message).await {
            tracing::warn!(recipient, error = %err, "Activation email delivery failed");
        }
    }
}
