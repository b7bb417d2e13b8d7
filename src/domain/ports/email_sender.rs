//! Email delivery port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Stable key identifying this logical send. Providers that honour it
    /// drop duplicates when a timed-out request is retried.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Provider acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailReceipt {
    /// Provider-assigned message id, when the provider returns one
    pub message_id: Option<String>,
}

/// Delivers already-rendered emails. Template selection happens in the engine.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, email: OutgoingEmail) -> DomainResult<EmailReceipt>;
}
