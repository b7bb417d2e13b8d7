//! Commerce coupon port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainResult;

/// Discount code as created on the commerce platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponResult {
    pub code: String,
    /// Platform id of the created discount code
    pub external_id: Option<String>,
}

/// Creates influencer discount codes on the commerce platform.
#[async_trait]
pub trait CouponProvisioner: Send + Sync {
    async fn create_discount_code(&self, influencer_id: Uuid, code: &str) -> DomainResult<CouponResult>;
}
