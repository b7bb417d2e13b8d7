//! Domain errors for the partnership workflow system.

use thiserror::Error;
use uuid::Uuid;

/// Join field names for display: `a, b, c`.
fn format_fields(fields: &[String]) -> String {
    fields.join(", ")
}

/// Domain-level errors surfaced by the workflow engine and its collaborators.
///
/// Every variant is recovered at the caller boundary (CLI or portal) and shown
/// to the user as-is; none are retried by the engine.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(Uuid),

    #[error("Influencer not found: {0}")]
    InfluencerNotFound(Uuid),

    #[error("Influencer {influencer_id} already has an active workflow ({workflow_id})")]
    AlreadyActive { influencer_id: Uuid, workflow_id: Uuid },

    #[error("Cannot advance: missing required fields: {}", format_fields(.0))]
    MissingFields(Vec<String>),

    #[error("Fields are locked: {}", format_fields(.0))]
    FieldLocked(Vec<String>),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Workflow {id} is {status} and can no longer be modified")]
    TerminalState { id: Uuid, status: String },

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition { from: String, to: String, reason: String },

    #[error("Portal token is invalid or expired")]
    PortalTokenInvalid,

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("External service {service} failed: {message}")]
    ExternalService { service: String, message: String },
}

impl DomainError {
    /// Shorthand for an [`DomainError::InvalidValue`] error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`DomainError::ExternalService`] error.
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
