//! Partnerflow - influencer partnership workflows
//!
//! Partnerflow walks each influencer partnership through five steps (terms,
//! shipping, preparing, contract, shipped), with a token-authorized portal for
//! the influencer, templated email notifications and discount code
//! provisioning on the store.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, the field-lock predicate, errors and port traits
//! - **Service Layer** (`services`): the workflow engine, portal and influencer services
//! - **Adapters** (`adapters`): SQLite persistence, email delivery, commerce API
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, retry policy
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use partnerflow::adapters::sqlite::{initialize_from_config, SqliteInfluencerRepository, SqliteWorkflowRepository};
//! use partnerflow::adapters::{commerce::DisabledCouponProvisioner, email::LogEmailSender};
//! use partnerflow::services::{Actor, WorkflowEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = partnerflow::ConfigLoader::load()?;
//!     let pool = initialize_from_config(&config.database).await?;
//!     let engine = WorkflowEngine::new(
//!         Arc::new(SqliteWorkflowRepository::new(pool.clone())),
//!         Arc::new(SqliteInfluencerRepository::new(pool)),
//!         Arc::new(LogEmailSender::new()),
//!         Arc::new(DisabledCouponProvisioner),
//!     );
//!     let outcome = engine.advance(workflow_id, &Actor::staff("rita")).await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, Influencer, InfluencerStatus, PartnershipWorkflow, WorkflowField,
    WorkflowFieldsUpdate, WorkflowStatus, WorkflowStep,
};
pub use domain::ports::{CouponProvisioner, EmailSender, InfluencerRepository, WorkflowRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Actor, InfluencerService, PortalService, WorkflowEngine};
