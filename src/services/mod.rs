//! Application services.
//!
//! - `WorkflowEngine`: the partnership state machine
//! - `PortalService`: token-authorized influencer surface over the engine
//! - `InfluencerService`: registration and portal tokens

pub mod influencer_service;
pub mod portal_service;
pub mod workflow_engine;

pub use influencer_service::InfluencerService;
pub use portal_service::{PortalField, PortalService, PortalView};
pub use workflow_engine::{Actor, NotificationOutcome, TransitionOutcome, WorkflowEngine};
