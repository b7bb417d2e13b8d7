//! Command-line interface.

pub mod commands;
pub mod context;
pub mod display;
pub mod types;

pub use types::{Cli, Commands};

use console::style;

use crate::domain::errors::DomainError;

/// Stable machine-readable code for an error, used in JSON output.
pub fn error_code(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<DomainError>() {
        Some(DomainError::WorkflowNotFound(_) | DomainError::InfluencerNotFound(_)) => "not_found",
        Some(DomainError::AlreadyActive { .. }) => "already_active",
        Some(DomainError::MissingFields(_)) => "missing_fields",
        Some(DomainError::FieldLocked(_)) => "field_locked",
        Some(DomainError::InvalidValue { .. } | DomainError::ValidationFailed(_)) => "invalid_value",
        Some(DomainError::TerminalState { .. }) => "terminal_state",
        Some(DomainError::InvalidStateTransition { .. }) => "invalid_transition",
        Some(DomainError::PortalTokenInvalid) => "portal_token_invalid",
        Some(DomainError::ExternalService { .. }) => "external_service",
        Some(DomainError::DatabaseError(_) | DomainError::SerializationError(_)) => "internal",
        None => "error",
    }
}

/// Print an error and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let fields = match err.downcast_ref::<DomainError>() {
            Some(DomainError::MissingFields(f) | DomainError::FieldLocked(f)) => Some(f.clone()),
            _ => None,
        };
        let body = serde_json::json!({
            "success": false,
            "error": error_code(&err),
            "message": format!("{err:#}"),
            "fields": fields,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", style("Error:").red().bold());
    }
    std::process::exit(1);
}
