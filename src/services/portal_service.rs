//! Influencer-facing portal, authorized by a portal token.
//!
//! Every call resolves the token to an influencer and its active workflow,
//! then delegates to [`WorkflowEngine`] as [`Actor::Influencer`]. The portal
//! can only touch the step-1 contact fields and the step-2 shipping fields.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::field_lock::is_field_locked;
use crate::domain::models::fields::{WorkflowField, WorkflowFieldsUpdate};
use crate::domain::models::influencer::{Influencer, InfluencerStatus};
use crate::domain::models::workflow::{PartnershipWorkflow, WorkflowStep};
use crate::domain::ports::{InfluencerRepository, WorkflowRepository};
use crate::services::workflow_engine::{Actor, TransitionOutcome, WorkflowEngine};

/// One influencer-writable field as shown in the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortalField {
    pub field: WorkflowField,
    pub value: Option<String>,
    pub locked: bool,
}

/// Read-only projection of the partnership for the influencer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortalView {
    pub influencer_name: String,
    pub influencer_status: InfluencerStatus,
    /// `None` when no partnership is in progress
    pub step: Option<u8>,
    pub step_label: Option<&'static str>,
    pub agreed_price: Option<Decimal>,
    pub fields: Vec<PortalField>,
    /// A price proposal is waiting for the influencer's answer
    pub can_accept: bool,
}

const PORTAL_FIELDS: [WorkflowField; 7] = [
    WorkflowField::ContactEmail,
    WorkflowField::ContactInstagram,
    WorkflowField::ContactWhatsapp,
    WorkflowField::ShippingAddress,
    WorkflowField::ProductSuggestion1,
    WorkflowField::ProductSuggestion2,
    WorkflowField::ProductSuggestion3,
];

pub struct PortalService<W: WorkflowRepository, I: InfluencerRepository> {
    engine: Arc<WorkflowEngine<W, I>>,
    influencers: Arc<I>,
}

impl<W: WorkflowRepository, I: InfluencerRepository> PortalService<W, I> {
    pub fn new(engine: Arc<WorkflowEngine<W, I>>, influencers: Arc<I>) -> Self {
        Self {
            engine,
            influencers,
        }
    }

    async fn influencer(&self, token: &str) -> DomainResult<Influencer> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::PortalTokenInvalid);
        }
        self.influencers
            .get_by_portal_token(token)
            .await?
            .ok_or(DomainError::PortalTokenInvalid)
    }

    async fn resolve(&self, token: &str) -> DomainResult<(Influencer, PartnershipWorkflow)> {
        let influencer = self.influencer(token).await?;
        let workflow = self
            .engine
            .get_active(influencer.id)
            .await?
            .ok_or_else(|| {
                DomainError::ValidationFailed("No partnership is in progress".to_string())
            })?;
        debug!(influencer_id = %influencer.id, workflow_id = %workflow.id, "Portal token resolved");
        Ok((influencer, workflow))
    }

    /// Current step, price and the influencer-writable fields with their locks.
    pub async fn view(&self, token: &str) -> DomainResult<PortalView> {
        let influencer = self.influencer(token).await?;
        let workflow = self.engine.get_active(influencer.id).await?;

        let Some(workflow) = workflow else {
            return Ok(PortalView {
                influencer_name: influencer.name,
                influencer_status: influencer.status,
                step: None,
                step_label: None,
                agreed_price: None,
                fields: Vec::new(),
                can_accept: false,
            });
        };

        let fields = PORTAL_FIELDS
            .into_iter()
            .map(|field| PortalField {
                field,
                value: field_value(field, &workflow),
                locked: is_field_locked(field, &workflow, influencer.status),
            })
            .collect();

        Ok(PortalView {
            can_accept: influencer.status == InfluencerStatus::CounterProposal
                && workflow.has_agreed_price(),
            influencer_name: influencer.name,
            influencer_status: influencer.status,
            step: Some(workflow.current_step.number()),
            step_label: Some(workflow.current_step.label()),
            agreed_price: workflow.terms.agreed_price,
            fields,
        })
    }

    /// Write contact or shipping fields. Any other field is rejected as locked.
    pub async fn update(
        &self,
        token: &str,
        update: &WorkflowFieldsUpdate,
    ) -> DomainResult<PartnershipWorkflow> {
        let (_, workflow) = self.resolve(token).await?;

        let foreign: Vec<String> = update
            .fields()
            .into_iter()
            .filter(|field| !field.is_influencer_writable())
            .map(|field| field.to_string())
            .collect();
        if !foreign.is_empty() {
            return Err(DomainError::FieldLocked(foreign));
        }

        self.engine
            .update_fields(workflow.id, update, &Actor::Influencer)
            .await
    }

    /// Submit the influencer's part of step 1 or step 2.
    pub async fn submit(&self, token: &str) -> DomainResult<TransitionOutcome> {
        let (_, workflow) = self.resolve(token).await?;

        match workflow.current_step {
            WorkflowStep::PartnershipTerms | WorkflowStep::Shipping => {
                self.engine.advance(workflow.id, &Actor::Influencer).await
            }
            step => Err(DomainError::InvalidStateTransition {
                from: step.to_string(),
                to: step
                    .next()
                    .map_or_else(|| "completed".to_string(), |next| next.to_string()),
                reason: "only steps 1 and 2 can be submitted from the portal".to_string(),
            }),
        }
    }

    pub async fn accept_counterproposal(&self, token: &str) -> DomainResult<TransitionOutcome> {
        let (_, workflow) = self.resolve(token).await?;
        self.engine
            .accept_counterproposal(workflow.id, &Actor::Influencer)
            .await
    }

    /// Propose a different price; staff review it next.
    pub async fn propose_price(&self, token: &str, price: Decimal) -> DomainResult<PartnershipWorkflow> {
        let (_, workflow) = self.resolve(token).await?;
        self.engine
            .propose_price(workflow.id, price, &Actor::Influencer)
            .await
    }
}

fn field_value(field: WorkflowField, workflow: &PartnershipWorkflow) -> Option<String> {
    let terms = &workflow.terms;
    let shipping = &workflow.shipping;
    match field {
        WorkflowField::ContactEmail => terms.contact_email.clone(),
        WorkflowField::ContactInstagram => terms.contact_instagram.clone(),
        WorkflowField::ContactWhatsapp => terms.contact_whatsapp.clone(),
        WorkflowField::ShippingAddress => shipping.shipping_address.as_ref().map(ToString::to_string),
        WorkflowField::ProductSuggestion1 => shipping.product_suggestion_1.clone(),
        WorkflowField::ProductSuggestion2 => shipping.product_suggestion_2.clone(),
        WorkflowField::ProductSuggestion3 => shipping.product_suggestion_3.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::commerce::MockCouponProvisioner;
    use crate::adapters::email::MockEmailSender;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteInfluencerRepository, SqliteWorkflowRepository,
    };
    use crate::domain::models::influencer::NewInfluencer;
    use crate::domain::models::workflow::ShippingAddress;
    use crate::services::influencer_service::InfluencerService;

    type Portal = PortalService<SqliteWorkflowRepository, SqliteInfluencerRepository>;
    type Engine = WorkflowEngine<SqliteWorkflowRepository, SqliteInfluencerRepository>;

    struct Setup {
        portal: Portal,
        engine: Arc<Engine>,
        token: String,
        influencer: Influencer,
    }

    async fn setup() -> Setup {
        let pool = create_migrated_test_pool().await.unwrap();
        let workflows = Arc::new(SqliteWorkflowRepository::new(pool.clone()));
        let influencers = Arc::new(SqliteInfluencerRepository::new(pool));
        let engine = Arc::new(WorkflowEngine::new(
            workflows,
            Arc::clone(&influencers),
            Arc::new(MockEmailSender::new()),
            Arc::new(MockCouponProvisioner::new()),
        ));

        let registry = InfluencerService::new(Arc::clone(&influencers));
        let influencer = registry
            .register(NewInfluencer {
                name: "Ana Lima".to_string(),
                email: Some("ana@example.com".to_string()),
                instagram_handle: Some("@ana".to_string()),
                tiktok_handle: Some("@ana.tt".to_string()),
                whatsapp_phone: Some("+351911111111".to_string()),
            })
            .await
            .unwrap();
        let token = registry.issue_portal_token(influencer.id).await.unwrap();

        Setup {
            portal: PortalService::new(Arc::clone(&engine), influencers),
            engine,
            token,
            influencer,
        }
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let s = setup().await;
        assert!(matches!(s.portal.view("nope").await, Err(DomainError::PortalTokenInvalid)));
        assert!(matches!(s.portal.submit("").await, Err(DomainError::PortalTokenInvalid)));
    }

    #[tokio::test]
    async fn test_view_without_workflow() {
        let s = setup().await;
        let view = s.portal.view(&s.token).await.unwrap();
        assert_eq!(view.step, None);
        assert!(view.fields.is_empty());
        assert_eq!(view.influencer_status, InfluencerStatus::Contacted);
    }

    #[tokio::test]
    async fn test_view_shows_step_and_locks() {
        let s = setup().await;
        s.engine
            .create(s.influencer.id, &Actor::staff("rita"))
            .await
            .unwrap();

        let view = s.portal.view(&s.token).await.unwrap();
        assert_eq!(view.step, Some(1));
        assert_eq!(view.fields.len(), PORTAL_FIELDS.len());
        assert!(view.fields.iter().all(|f| !f.locked));
        assert!(!view.can_accept);
    }

    #[tokio::test]
    async fn test_update_rejects_staff_fields() {
        let s = setup().await;
        s.engine
            .create(s.influencer.id, &Actor::staff("rita"))
            .await
            .unwrap();

        let update = WorkflowFieldsUpdate {
            contact_instagram: Some("@ana.new".to_string()),
            coupon_code: Some("FREE".to_string()),
            agreed_price: Some(Decimal::from(1000)),
            ..Default::default()
        };
        match s.portal.update(&s.token, &update).await {
            Err(DomainError::FieldLocked(fields)) => {
                assert_eq!(fields, vec!["agreedPrice", "couponCode"]);
            }
            other => panic!("expected FieldLocked, got {other:?}"),
        }

        let ok = WorkflowFieldsUpdate {
            contact_instagram: Some("@ana.new".to_string()),
            ..Default::default()
        };
        let workflow = s.portal.update(&s.token, &ok).await.unwrap();
        assert_eq!(workflow.terms.contact_instagram.as_deref(), Some("@ana.new"));
    }

    #[tokio::test]
    async fn test_submit_steps_one_and_two_only() {
        let s = setup().await;
        s.engine
            .create(s.influencer.id, &Actor::staff("rita"))
            .await
            .unwrap();

        let outcome = s.portal.submit(&s.token).await.unwrap();
        assert_eq!(outcome.workflow.current_step, WorkflowStep::Shipping);

        assert!(matches!(
            s.portal.submit(&s.token).await,
            Err(DomainError::MissingFields(_))
        ));

        let shipping = WorkflowFieldsUpdate {
            shipping_address: Some(ShippingAddress::new("Rua Augusta 1", "1100-048", "Portugal")),
            product_suggestion_1: Some("Serum".to_string()),
            ..Default::default()
        };
        s.portal.update(&s.token, &shipping).await.unwrap();
        let outcome = s.portal.submit(&s.token).await.unwrap();
        assert_eq!(outcome.workflow.current_step, WorkflowStep::Preparing);

        assert!(matches!(
            s.portal.submit(&s.token).await,
            Err(DomainError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_counterproposal_through_portal() {
        let s = setup().await;
        let wf = s
            .engine
            .create(s.influencer.id, &Actor::staff("rita"))
            .await
            .unwrap();
        s.engine
            .send_counterproposal(wf.id, Decimal::from(200), &Actor::staff("rita"))
            .await
            .unwrap();

        let view = s.portal.view(&s.token).await.unwrap();
        assert!(view.can_accept);
        assert_eq!(view.agreed_price, Some(Decimal::from(200)));

        let outcome = s.portal.accept_counterproposal(&s.token).await.unwrap();
        assert_eq!(outcome.influencer_status, InfluencerStatus::Agreed);
    }

    #[tokio::test]
    async fn test_propose_price_moves_to_analyzing() {
        let s = setup().await;
        s.engine
            .create(s.influencer.id, &Actor::staff("rita"))
            .await
            .unwrap();

        assert!(matches!(
            s.portal.propose_price(&s.token, Decimal::ZERO).await,
            Err(DomainError::InvalidValue { .. })
        ));

        let workflow = s.portal.propose_price(&s.token, Decimal::from(180)).await.unwrap();
        assert_eq!(workflow.terms.agreed_price, Some(Decimal::from(180)));

        let view = s.portal.view(&s.token).await.unwrap();
        assert_eq!(view.influencer_status, InfluencerStatus::Analyzing);
        assert!(view.fields.iter().all(|f| f.locked));

        let update = WorkflowFieldsUpdate {
            contact_instagram: Some("@other".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            s.portal.update(&s.token, &update).await,
            Err(DomainError::FieldLocked(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_waits_for_pending_price() {
        let s = setup().await;
        let wf = s
            .engine
            .create(s.influencer.id, &Actor::staff("rita"))
            .await
            .unwrap();

        s.portal.propose_price(&s.token, Decimal::from(99_999)).await.unwrap();
        assert!(matches!(
            s.portal.submit(&s.token).await,
            Err(DomainError::InvalidStateTransition { .. })
        ));

        s.engine
            .send_counterproposal(wf.id, Decimal::from(150), &Actor::staff("rita"))
            .await
            .unwrap();
        assert!(matches!(
            s.portal.submit(&s.token).await,
            Err(DomainError::InvalidStateTransition { .. })
        ));

        let view = s.portal.view(&s.token).await.unwrap();
        assert_eq!(view.step, Some(1));
        assert_eq!(view.influencer_status, InfluencerStatus::CounterProposal);
    }

    #[tokio::test]
    async fn test_influencer_cannot_accept_own_proposal() {
        let s = setup().await;
        s.engine
            .create(s.influencer.id, &Actor::staff("rita"))
            .await
            .unwrap();
        s.portal.propose_price(&s.token, Decimal::from(500)).await.unwrap();

        assert!(matches!(
            s.portal.accept_counterproposal(&s.token).await,
            Err(DomainError::InvalidStateTransition { .. })
        ));
        let view = s.portal.view(&s.token).await.unwrap();
        assert_eq!(view.influencer_status, InfluencerStatus::Analyzing);
    }
}
