//! CLI command implementations.

pub mod influencer;
pub mod init;
pub mod portal;
pub mod workflow;
