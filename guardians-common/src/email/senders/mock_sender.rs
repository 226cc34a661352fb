use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::email::{EmailError, EmailMessage, SendEmail};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentEmail {
    pub destination: String,
    pub subject: String,
    pub body: String,
}

/// Logs messages instead of sending them. Every message is also kept in an outbox that tests can
/// inspect through `outbox()`.
#[derive(Default)]
pub struct MockSender {
    outbox: Arc<Mutex<Vec<SentEmail>>>,
    failing_destination: Option<String>,
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender that refuses every message addressed to `destination`.
    pub fn failing_for(destination: &str) -> Self {
        Self {
            outbox: Arc::default(),
            failing_destination: Some(String::from(destination)),
        }
    }

    pub fn outbox(&self) -> Arc<Mutex<Vec<SentEmail>>> {
        Arc::clone(&self.outbox)
    }
}

#[async_trait]
impl SendEmail for MockSender {
    async fn send<'a>(&self, message: EmailMessage<'a>) -> Result<(), EmailError> {
        if self.failing_destination.as_deref() == Some(message.destination) {
            return Err(EmailError::RelayConnectionFailed(String::from(
                "Mock relay refused the message",
            )));
        }

        log::debug!("Mock email to {}: {}", message.destination, message.subject);

        self.outbox
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SentEmail {
                destination: String::from(message.destination),
                subject: String::from(message.subject),
                body: message.body,
            });

        Ok(())
    }
}
