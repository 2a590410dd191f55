//! SMTP notifier implementation using lettre

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::{Notifier, NotifyError};

/// Notifier that delivers through an SMTP relay
///
/// Configured from the CLI at startup. One transport is built per send so a
/// dropped relay connection cannot wedge the service.
pub struct SmtpNotifier {
    server: String,
    port: u16,
    credentials: Option<Credentials>,
}

impl SmtpNotifier {
    /// Create a notifier for the given relay
    ///
    /// `credentials` may be omitted for relays that accept unauthenticated
    /// submission (local test relays, typically).
    pub fn new(server: String, port: u16, credentials: Option<(String, String)>) -> Self {
        SmtpNotifier {
            server,
            port,
            credentials: credentials.map(|(user, pass)| Credentials::new(user, pass)),
        }
    }

    fn build_transport(&self) -> Result<SmtpTransport, NotifyError> {
        let mut builder = SmtpTransport::relay(&self.server).map_err(|e| NotifyError::Transport {
            message: e.to_string(),
        })?;
        builder = builder.port(self.port);
        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(credentials.clone());
        }
        Ok(builder.build())
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(from.parse().map_err(|_| NotifyError::Message {
                message: format!("invalid from address: {}", from),
            })?)
            .to(to.parse().map_err(|_| NotifyError::Message {
                message: format!("invalid to address: {}", to),
            })?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| NotifyError::Message {
                message: e.to_string(),
            })?;

        self.build_transport()?
            .send(&message)
            .map_err(|e| NotifyError::Transport {
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_from_address_is_message_error() {
        let notifier = SmtpNotifier::new("smtp.example.com".to_string(), 587, None);
        let err = notifier
            .send("not an address", "b@example.com", "hi", "body")
            .unwrap_err();
        assert!(matches!(err, NotifyError::Message { .. }));
    }
}
