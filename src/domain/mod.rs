//! Domain layer for the partnership workflow system
//!
//! This module contains the workflow model, the field-lock and required-field
//! rules, email templates, and the ports adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
