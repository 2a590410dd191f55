//! Notification service
//!
//! Transaction creation emits a notification intent to the receiver. The
//! [`Notifier`] trait keeps the lifecycle manager independent of the
//! delivery mechanism; the engine treats every implementation as
//! best-effort and never lets a delivery failure roll back a transaction.
//!
//! Two implementations ship:
//! - [`SmtpNotifier`] sends real email through an SMTP relay (lettre)
//! - [`LogNotifier`] records the intent to the log only; the default when
//!   no SMTP relay is configured, and the usual test double

mod smtp;

pub use smtp::SmtpNotifier;

use thiserror::Error;
use tracing::info;

/// Delivery failure reported by a notifier
///
/// Callers log and swallow these; they never propagate past the lifecycle
/// manager.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// An address or the message body could not be assembled
    #[error("invalid message: {message}")]
    Message {
        /// Description from the mail builder
        message: String,
    },

    /// The relay rejected or failed the send
    #[error("delivery failed: {message}")]
    Transport {
        /// Description from the transport
        message: String,
    },
}

/// Best-effort delivery of a notification intent
pub trait Notifier: Send + Sync {
    /// Send one message from `from` to `to`
    fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        (**self).send(from, to, subject, body)
    }
}

/// Notifier that records intents to the log instead of delivering them
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        LogNotifier
    }
}

impl Notifier for LogNotifier {
    fn send(&self, from: &str, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        info!(from = %from, to = %to, subject = %subject, "notification intent (log only)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier::new();
        let result = notifier.send("a@example.com", "b@example.com", "hi", "body");
        assert!(result.is_ok());
    }
}
