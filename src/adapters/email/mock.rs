//! In-memory email sender for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::email_sender::{EmailReceipt, EmailSender, OutgoingEmail};

/// Captures every email and can be switched into a failing mode.
#[derive(Debug, Clone, Default)]
pub struct MockEmailSender {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let sender = Self::default();
        sender.fail_with(Some(message.into()));
        sender
    }

    pub fn fail_with(&self, message: Option<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = message;
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send_email(&self, email: OutgoingEmail) -> DomainResult<EmailReceipt> {
        let failure = self.failure.lock().ok().and_then(|f| f.clone());
        if let Some(message) = failure {
            return Err(DomainError::external("email", message));
        }

        let mut sent = self
            .sent
            .lock()
            .map_err(|_| DomainError::external("email", "mock sender poisoned"))?;
        sent.push(email);
        Ok(EmailReceipt {
            message_id: Some(format!("mock-{}", sent.len())),
        })
    }
}
