//! In-memory coupon provisioner for tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::coupon_provisioner::{CouponProvisioner, CouponResult};

/// Records created codes and rejects duplicates like a real store would.
#[derive(Debug, Clone, Default)]
pub struct MockCouponProvisioner {
    created: Arc<Mutex<Vec<(Uuid, String)>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockCouponProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        let provisioner = Self::default();
        if let Ok(mut failure) = provisioner.failure.lock() {
            *failure = Some(message.into());
        }
        provisioner
    }

    pub fn created(&self) -> Vec<(Uuid, String)> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CouponProvisioner for MockCouponProvisioner {
    async fn create_discount_code(&self, influencer_id: Uuid, code: &str) -> DomainResult<CouponResult> {
        let failure = self.failure.lock().ok().and_then(|f| f.clone());
        if let Some(message) = failure {
            return Err(DomainError::external("commerce", message));
        }

        let mut created = self
            .created
            .lock()
            .map_err(|_| DomainError::external("commerce", "mock provisioner poisoned"))?;
        let existing: HashSet<&str> = created.iter().map(|(_, c)| c.as_str()).collect();
        if existing.contains(code) {
            return Err(DomainError::external(
                "commerce",
                format!("discount code {code} already exists"),
            ));
        }
        created.push((influencer_id, code.to_string()));
        Ok(CouponResult {
            code: code.to_string(),
            external_id: Some(format!("mock-{}", created.len())),
        })
    }
}
