//! Commerce platform adapters for discount code provisioning.

pub mod client;
pub mod disabled;
pub mod mock;

pub use client::HttpCouponProvisioner;
pub use disabled::DisabledCouponProvisioner;
pub use mock::MockCouponProvisioner;
