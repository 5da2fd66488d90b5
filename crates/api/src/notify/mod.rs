//! Activation-code delivery.
//!
//! Delivery is an external collaborator: the core only needs "send this
//! code to this address". Sending is best-effort -- a delivery failure is
//! logged and never rolls back the token creation that triggered it.

pub mod smtp;

use async_trait::async_trait;

/// Delivers activation codes to a recipient address.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `code` to `recipient`. Best-effort; implementations report
    /// failures through logging, not through a return value.
    async fn send(&self, recipient: &str, code: &str);
}

/// Development notifier: writes the code to the log instead of sending it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, code: &str) {
        tracing::info!(recipient, code, "Activation code issued (log-only notifier)");
    }
}
