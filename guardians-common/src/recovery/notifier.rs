use lettre::message::Mailbox;

use crate::email::templates::RecoverySecretMessage;
use crate::email::{EmailError, EmailMessage, SendEmail};

const RECOVERY_SUBJECT: &str = "Account recovery";

#[derive(Clone, Debug)]
pub struct RecoveryNotifier {
    from: Mailbox,
    reply_to: Mailbox,
    recovery_url: String,
}

impl RecoveryNotifier {
    pub fn new(from: Mailbox, reply_to: Mailbox, recovery_url: &str) -> Self {
        Self {
            from,
            reply_to,
            recovery_url: String::from(recovery_url),
        }
    }

    pub async fn send_recovery_secret(
        &self,
        sender: &dyn SendEmail,
        destination: &str,
        recovery_secret: &str,
        recovery_address: &str,
    ) -> Result<(), EmailError> {
        if destination.trim().is_empty() {
            return Err(EmailError::InvalidDestination);
        }

        if recovery_secret.is_empty() {
            return Err(EmailError::MissingRecoverySecret);
        }

        let message = EmailMessage {
            body: RecoverySecretMessage::generate(
                recovery_secret,
                recovery_address,
                &self.recovery_url,
            ),
            subject: RECOVERY_SUBJECT,
            from: self.from.clone(),
            reply_to: self.reply_to.clone(),
            destination,
            is_html: true,
        };

        sender.send(message).await
    }
}
