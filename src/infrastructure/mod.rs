//! Infrastructure layer module
//!
//! Cross-cutting concerns shared by adapters and the CLI:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - Retry policy for outbound HTTP calls (backoff)

pub mod config;
pub mod logging;
pub mod retry;
