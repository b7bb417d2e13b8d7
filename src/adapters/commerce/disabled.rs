//! Provisioner used when no commerce platform is configured.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::coupon_provisioner::{CouponProvisioner, CouponResult};

#[derive(Debug, Clone, Default)]
pub struct DisabledCouponProvisioner;

#[async_trait]
impl CouponProvisioner for DisabledCouponProvisioner {
    async fn create_discount_code(&self, _influencer_id: Uuid, _code: &str) -> DomainResult<CouponResult> {
        Err(DomainError::external(
            "commerce",
            "no commerce platform configured; set commerce.base_url, access_token and price_rule_id",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_fails() {
        let result = DisabledCouponProvisioner
            .create_discount_code(Uuid::new_v4(), "ANA10")
            .await;
        assert!(matches!(result, Err(DomainError::ExternalService { ref service, .. }) if service == "commerce"));
    }
}
