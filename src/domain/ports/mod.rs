//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - WorkflowRepository: persistence of partnership workflows
//! - InfluencerRepository: persistence of influencer profiles and status
//! - EmailSender: delivery of rendered emails
//! - CouponProvisioner: discount code creation on the commerce platform

pub mod coupon_provisioner;
pub mod email_sender;
pub mod influencer_repository;
pub mod workflow_repository;

pub use coupon_provisioner::{CouponProvisioner, CouponResult};
pub use email_sender::{EmailReceipt, EmailSender, OutgoingEmail};
pub use influencer_repository::InfluencerRepository;
pub use workflow_repository::WorkflowRepository;
