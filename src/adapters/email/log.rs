//! Email sender that only records deliveries in the log.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::ports::email_sender::{EmailReceipt, EmailSender, OutgoingEmail};

/// Used when no email provider is configured.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_email(&self, email: OutgoingEmail) -> DomainResult<EmailReceipt> {
        let message_id = format!("log-{}", Uuid::new_v4());
        info!(
            to = %email.to,
            subject = %email.subject,
            message_id = %message_id,
            body_len = email.body.len(),
            "Email recorded (no provider configured)"
        );
        Ok(EmailReceipt {
            message_id: Some(message_id),
        })
    }
}
