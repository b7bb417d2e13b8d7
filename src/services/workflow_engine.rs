//! Partnership workflow state machine.
//!
//! The `WorkflowEngine` owns the workflow record lifecycle: creation, step
//! advancement, field updates, counter-proposals, coupon provisioning,
//! cancellation and restart. Every write goes through [`is_field_locked`]
//! and every advance through the required-field table.
//!
//! Email is a side effect of a transition: a failed send is logged and
//! reported in the outcome but never rolls the transition back.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::config::PortalConfig;
use crate::domain::models::email_template::{
    template_variables, EmailTemplates, RenderedEmail, TemplateVariables,
    COUNTERPROPOSAL_ACCEPTED_KEY, COUNTERPROPOSAL_KEY,
};
use crate::domain::models::field_lock::{is_field_locked, lock_matrix, locked_fields, FieldLockState};
use crate::domain::models::fields::{WorkflowField, WorkflowFieldsUpdate};
use crate::domain::models::influencer::{Influencer, InfluencerStatus};
use crate::domain::models::requirements::missing_fields;
use crate::domain::models::workflow::{EmailRecord, PartnershipWorkflow, WorkflowStep};
use crate::domain::ports::{CouponProvisioner, EmailSender, InfluencerRepository, OutgoingEmail, WorkflowRepository};

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    Staff { name: String },
    Influencer,
    System,
}

impl Actor {
    pub fn staff(name: impl Into<String>) -> Self {
        Self::Staff { name: name.into() }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staff { name } => write!(f, "staff:{name}"),
            Self::Influencer => f.write_str("influencer"),
            Self::System => f.write_str("system"),
        }
    }
}

/// What happened to the email attached to an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent {
        to: String,
        template_key: String,
        message_id: Option<String>,
    },
    Failed {
        template_key: String,
        reason: String,
    },
    Skipped {
        template_key: String,
        reason: String,
    },
}

impl NotificationOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Result of an operation that moves the partnership forward and notifies the influencer.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub workflow: PartnershipWorkflow,
    pub influencer_status: InfluencerStatus,
    /// Step that was left, for `advance`
    pub left_step: Option<WorkflowStep>,
    pub notification: NotificationOutcome,
}

/// The partnership workflow engine.
pub struct WorkflowEngine<W: WorkflowRepository, I: InfluencerRepository> {
    workflows: Arc<W>,
    influencers: Arc<I>,
    email_sender: Arc<dyn EmailSender>,
    coupons: Arc<dyn CouponProvisioner>,
    templates: EmailTemplates,
    portal: PortalConfig,
}

impl<W: WorkflowRepository, I: InfluencerRepository> WorkflowEngine<W, I> {
    pub fn new(
        workflows: Arc<W>,
        influencers: Arc<I>,
        email_sender: Arc<dyn EmailSender>,
        coupons: Arc<dyn CouponProvisioner>,
    ) -> Self {
        Self {
            workflows,
            influencers,
            email_sender,
            coupons,
            templates: EmailTemplates::builtin(),
            portal: PortalConfig::default(),
        }
    }

    #[must_use]
    pub fn with_templates(mut self, templates: EmailTemplates) -> Self {
        self.templates = templates;
        self
    }

    #[must_use]
    pub fn with_portal(mut self, portal: PortalConfig) -> Self {
        self.portal = portal;
        self
    }

    async fn load(&self, id: Uuid) -> DomainResult<PartnershipWorkflow> {
        self.workflows
            .get(id)
            .await?
            .ok_or(DomainError::WorkflowNotFound(id))
    }

    async fn load_influencer(&self, id: Uuid) -> DomainResult<Influencer> {
        self.influencers
            .get(id)
            .await?
            .ok_or(DomainError::InfluencerNotFound(id))
    }

    async fn set_influencer_status(
        &self,
        influencer: &mut Influencer,
        status: InfluencerStatus,
    ) -> DomainResult<()> {
        if influencer.status != status {
            info!(influencer_id = %influencer.id, from = %influencer.status, to = %status, "Influencer status changed");
            influencer.set_status(status);
            self.influencers.save(influencer).await?;
        }
        Ok(())
    }

    fn render(
        &self,
        key: &str,
        workflow: &PartnershipWorkflow,
        influencer: &Influencer,
    ) -> DomainResult<RenderedEmail> {
        let variables = self.variables(workflow, influencer);
        self.templates.render_key(key, &variables)
    }

    fn variables(
        &self,
        workflow: &PartnershipWorkflow,
        influencer: &Influencer,
    ) -> TemplateVariables {
        let portal_url = influencer
            .portal_token
            .as_deref()
            .and_then(|token| self.portal.url_for(token));
        template_variables(workflow, influencer, portal_url.as_deref())
    }

    /// Send a rendered email and append it to the log on success.
    async fn notify(
        &self,
        workflow: &mut PartnershipWorkflow,
        influencer: &Influencer,
        step: WorkflowStep,
        rendered: RenderedEmail,
        actor: &Actor,
    ) -> NotificationOutcome {
        let recipient = workflow
            .terms
            .contact_email
            .clone()
            .or_else(|| influencer.email.clone());

        let Some(to) = recipient else {
            warn!(workflow_id = %workflow.id, template = %rendered.template_key, "No recipient address; email skipped");
            return NotificationOutcome::Skipped {
                template_key: rendered.template_key,
                reason: "no contact or profile email".to_string(),
            };
        };

        // Every transition touches the record, so its timestamp identifies the send.
        let email = OutgoingEmail {
            to: to.clone(),
            subject: rendered.subject.clone(),
            body: rendered.body.clone(),
            idempotency_key: Some(format!(
                "{}:{}:{}:{}",
                workflow.id,
                step.number(),
                rendered.template_key,
                workflow.updated_at.timestamp_micros()
            )),
        };

        match self.email_sender.send_email(email).await {
            Ok(receipt) => {
                workflow.record_email(EmailRecord {
                    step,
                    template_key: rendered.template_key.clone(),
                    subject: rendered.subject,
                    body: rendered.body,
                    sent_by: actor.to_string(),
                    sent_at: chrono::Utc::now(),
                });
                if let Err(e) = self.workflows.save(workflow).await {
                    warn!(workflow_id = %workflow.id, error = %e, "Email sent but log entry could not be saved");
                }
                info!(workflow_id = %workflow.id, template = %rendered.template_key, %to, "Email sent");
                NotificationOutcome::Sent {
                    to,
                    template_key: rendered.template_key,
                    message_id: receipt.message_id,
                }
            }
            Err(e) => {
                warn!(workflow_id = %workflow.id, template = %rendered.template_key, error = %e, "Email failed; transition kept");
                NotificationOutcome::Failed {
                    template_key: rendered.template_key,
                    reason: e.to_string(),
                }
            }
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// The influencer's ACTIVE workflow, if any.
    pub async fn get_active(&self, influencer_id: Uuid) -> DomainResult<Option<PartnershipWorkflow>> {
        self.workflows.get_active_by_influencer(influencer_id).await
    }

    pub async fn get(&self, workflow_id: Uuid) -> DomainResult<PartnershipWorkflow> {
        self.load(workflow_id).await
    }

    /// Every workflow of the influencer, newest first.
    pub async fn list_for_influencer(&self, influencer_id: Uuid) -> DomainResult<Vec<PartnershipWorkflow>> {
        self.workflows.list_by_influencer(influencer_id).await
    }

    /// Lock state of every field under the influencer's current status.
    pub async fn field_locks(&self, workflow_id: Uuid) -> DomainResult<Vec<FieldLockState>> {
        let workflow = self.load(workflow_id).await?;
        let influencer = self.load_influencer(workflow.influencer_id).await?;
        Ok(lock_matrix(&workflow, influencer.status))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Open a new workflow at step 1.
    pub async fn create(&self, influencer_id: Uuid, actor: &Actor) -> DomainResult<PartnershipWorkflow> {
        let mut influencer = self.load_influencer(influencer_id).await?;

        if let Some(active) = self.workflows.get_active_by_influencer(influencer_id).await? {
            return Err(DomainError::AlreadyActive {
                influencer_id,
                workflow_id: active.id,
            });
        }

        let workflow = PartnershipWorkflow::new(influencer_id);
        self.workflows.save(&workflow).await?;
        self.set_influencer_status(&mut influencer, InfluencerStatus::Negotiating)
            .await?;

        info!(workflow_id = %workflow.id, %influencer_id, %actor, "Workflow created");
        Ok(workflow)
    }

    /// Write a partial set of fields.
    ///
    /// Either every provided field is written or none is: if any field whose
    /// value would change is locked, the call fails naming all of them.
    pub async fn update_fields(
        &self,
        workflow_id: Uuid,
        update: &WorkflowFieldsUpdate,
        actor: &Actor,
    ) -> DomainResult<PartnershipWorkflow> {
        let mut workflow = self.load(workflow_id).await?;
        workflow.ensure_mutable()?;
        update.validate()?;

        let influencer = self.load_influencer(workflow.influencer_id).await?;

        let mut candidate = workflow.clone();
        update.apply_to(&mut candidate);
        let changed: Vec<WorkflowField> = update
            .fields()
            .into_iter()
            .filter(|field| field.differs(&workflow, &candidate))
            .collect();

        if changed.is_empty() {
            return Ok(workflow);
        }

        let locked = locked_fields(&changed, &workflow, influencer.status);
        if !locked.is_empty() {
            warn!(%workflow_id, %actor, status = %influencer.status, ?locked, "Update rejected: locked fields");
            return Err(DomainError::FieldLocked(
                locked.iter().map(ToString::to_string).collect(),
            ));
        }

        update.apply_to(&mut workflow);
        workflow.touch();
        self.workflows.save(&workflow).await?;

        info!(%workflow_id, %actor, fields = ?changed, "Workflow fields updated");
        Ok(workflow)
    }

    /// Leave the current step once its required fields are present.
    pub async fn advance(&self, workflow_id: Uuid, actor: &Actor) -> DomainResult<TransitionOutcome> {
        let mut workflow = self.load(workflow_id).await?;
        workflow.ensure_mutable()?;
        let mut influencer = self.load_influencer(workflow.influencer_id).await?;

        // Step 1 closes on an agreed price, never on one still under negotiation.
        if workflow.current_step == WorkflowStep::PartnershipTerms
            && influencer.status.is_counter_negotiation()
        {
            return Err(DomainError::InvalidStateTransition {
                from: influencer.status.to_string(),
                to: InfluencerStatus::Agreed.to_string(),
                reason: "a price proposal is still pending; accept it first".to_string(),
            });
        }

        let missing = missing_fields(&workflow, &influencer);
        if !missing.is_empty() {
            return Err(DomainError::MissingFields(missing));
        }

        let left = workflow.step_forward()?;
        let status = if workflow.is_terminal() {
            InfluencerStatus::Completed
        } else {
            status_for_step(workflow.current_step)
        };
        self.workflows.save(&workflow).await?;
        self.set_influencer_status(&mut influencer, status).await?;

        info!(
            %workflow_id,
            %actor,
            from = left.number(),
            to = workflow.current_step.number(),
            completed = workflow.is_terminal(),
            "Workflow advanced"
        );

        let variables = self.variables(&workflow, &influencer);
        let rendered = self
            .templates
            .render_step(left, workflow.has_agreed_price(), &variables);
        let notification = self
            .notify(&mut workflow, &influencer, left, rendered, actor)
            .await;

        Ok(TransitionOutcome {
            workflow,
            influencer_status: influencer.status,
            left_step: Some(left),
            notification,
        })
    }

    /// Staff proposes a price to the influencer.
    pub async fn send_counterproposal(
        &self,
        workflow_id: Uuid,
        price: Decimal,
        actor: &Actor,
    ) -> DomainResult<TransitionOutcome> {
        if price <= Decimal::ZERO {
            return Err(DomainError::invalid_value(
                WorkflowField::AgreedPrice.as_str(),
                "must be greater than zero",
            ));
        }

        let mut workflow = self.load(workflow_id).await?;
        workflow.ensure_mutable()?;
        let mut influencer = self.load_influencer(workflow.influencer_id).await?;

        if influencer.status.has_reached(InfluencerStatus::Agreed) {
            return Err(DomainError::FieldLocked(vec![
                WorkflowField::AgreedPrice.to_string()
            ]));
        }

        workflow.terms.agreed_price = Some(price);
        workflow.touch();
        self.workflows.save(&workflow).await?;
        self.set_influencer_status(&mut influencer, InfluencerStatus::CounterProposal)
            .await?;

        info!(%workflow_id, %actor, %price, "Counter-proposal sent");

        let rendered = self.render(COUNTERPROPOSAL_KEY, &workflow, &influencer)?;
        let step = workflow.current_step;
        let notification = self
            .notify(&mut workflow, &influencer, step, rendered, actor)
            .await;

        Ok(TransitionOutcome {
            workflow,
            influencer_status: influencer.status,
            left_step: None,
            notification,
        })
    }

    /// Influencer proposes a price; staff review follows.
    pub async fn propose_price(
        &self,
        workflow_id: Uuid,
        price: Decimal,
        actor: &Actor,
    ) -> DomainResult<PartnershipWorkflow> {
        if price <= Decimal::ZERO {
            return Err(DomainError::invalid_value(
                WorkflowField::AgreedPrice.as_str(),
                "must be greater than zero",
            ));
        }

        let mut workflow = self.load(workflow_id).await?;
        workflow.ensure_mutable()?;
        let mut influencer = self.load_influencer(workflow.influencer_id).await?;

        if is_field_locked(WorkflowField::AgreedPrice, &workflow, influencer.status) {
            return Err(DomainError::FieldLocked(vec![
                WorkflowField::AgreedPrice.to_string()
            ]));
        }

        workflow.terms.agreed_price = Some(price);
        workflow.touch();
        self.workflows.save(&workflow).await?;
        self.set_influencer_status(&mut influencer, InfluencerStatus::Analyzing)
            .await?;

        info!(%workflow_id, %actor, %price, "Price proposed; awaiting review");
        Ok(workflow)
    }

    /// Accept the price the other side put on the table.
    ///
    /// The influencer accepts staff counter-proposals (`counter_proposal`);
    /// staff accept the influencer's own proposal (`analyzing`).
    pub async fn accept_counterproposal(
        &self,
        workflow_id: Uuid,
        actor: &Actor,
    ) -> DomainResult<TransitionOutcome> {
        let mut workflow = self.load(workflow_id).await?;
        workflow.ensure_mutable()?;
        let mut influencer = self.load_influencer(workflow.influencer_id).await?;

        let pending_for_actor = match actor {
            Actor::Influencer => InfluencerStatus::CounterProposal,
            Actor::Staff { .. } | Actor::System => InfluencerStatus::Analyzing,
        };
        if influencer.status != pending_for_actor {
            let reason = if influencer.status.is_counter_negotiation() {
                format!("{actor} cannot accept its own proposal")
            } else {
                "no counter-proposal is pending".to_string()
            };
            return Err(DomainError::InvalidStateTransition {
                from: influencer.status.to_string(),
                to: InfluencerStatus::Agreed.to_string(),
                reason,
            });
        }
        if !workflow.has_agreed_price() {
            return Err(DomainError::invalid_value(
                WorkflowField::AgreedPrice.as_str(),
                "no positive price to accept",
            ));
        }

        self.set_influencer_status(&mut influencer, InfluencerStatus::Agreed)
            .await?;
        workflow.touch();
        self.workflows.save(&workflow).await?;

        info!(%workflow_id, %actor, price = ?workflow.terms.agreed_price, "Counter-proposal accepted");

        let rendered = self.render(COUNTERPROPOSAL_ACCEPTED_KEY, &workflow, &influencer)?;
        let step = workflow.current_step;
        let notification = self
            .notify(&mut workflow, &influencer, step, rendered, actor)
            .await;

        Ok(TransitionOutcome {
            workflow,
            influencer_status: influencer.status,
            left_step: None,
            notification,
        })
    }

    /// Create the influencer's discount code on the commerce platform.
    pub async fn create_coupon(
        &self,
        workflow_id: Uuid,
        code: &str,
        actor: &Actor,
    ) -> DomainResult<PartnershipWorkflow> {
        let mut workflow = self.load(workflow_id).await?;
        if !workflow.is_active() || workflow.current_step != WorkflowStep::Preparing {
            return Err(DomainError::InvalidStateTransition {
                from: format!("{} at step {}", workflow.status, workflow.current_step),
                to: "coupon".to_string(),
                reason: "coupons are created while preparing (step 3) on an active workflow"
                    .to_string(),
            });
        }

        let code = code.trim();
        validate_coupon_code(code)?;

        let created = self
            .coupons
            .create_discount_code(workflow.influencer_id, code)
            .await?;

        workflow.preparation.coupon_code = Some(created.code.clone());
        workflow.touch();
        self.workflows.save(&workflow).await?;

        info!(%workflow_id, %actor, code = %created.code, external_id = ?created.external_id, "Coupon created");
        Ok(workflow)
    }

    /// Start over with a fresh step-1 workflow.
    ///
    /// Returns the new workflow; the old one is terminal and points at it.
    pub async fn restart(
        &self,
        workflow_id: Uuid,
        force: bool,
        actor: &Actor,
    ) -> DomainResult<PartnershipWorkflow> {
        let mut old = self.load(workflow_id).await?;

        if let Some(next) = old.superseded_by {
            return Err(DomainError::InvalidStateTransition {
                from: old.status.to_string(),
                to: "restarted".to_string(),
                reason: format!("already superseded by {next}"),
            });
        }
        if !(old.is_terminal() || old.current_step == WorkflowStep::Shipped || force) {
            return Err(DomainError::InvalidStateTransition {
                from: format!("{} at step {}", old.status, old.current_step),
                to: "restarted".to_string(),
                reason: "workflow is still in progress; use force to restart".to_string(),
            });
        }

        let mut influencer = self.load_influencer(old.influencer_id).await?;
        if let Some(active) = self.workflows.get_active_by_influencer(old.influencer_id).await? {
            if active.id != old.id {
                return Err(DomainError::AlreadyActive {
                    influencer_id: old.influencer_id,
                    workflow_id: active.id,
                });
            }
        }

        let fresh = PartnershipWorkflow::new(old.influencer_id);
        old.superseded_by = Some(fresh.id);
        if old.is_active() {
            old.cancel()?;
        } else {
            old.touch();
        }
        self.workflows.supersede(&old, &fresh).await?;
        self.set_influencer_status(&mut influencer, InfluencerStatus::Negotiating)
            .await?;

        info!(old_workflow_id = %old.id, new_workflow_id = %fresh.id, %actor, force, "Workflow restarted");
        Ok(fresh)
    }

    /// Cancel from any step.
    pub async fn cancel(&self, workflow_id: Uuid, actor: &Actor) -> DomainResult<PartnershipWorkflow> {
        let mut workflow = self.load(workflow_id).await?;
        workflow.cancel()?;
        self.workflows.save(&workflow).await?;

        info!(%workflow_id, %actor, step = workflow.current_step.number(), "Workflow cancelled");
        Ok(workflow)
    }
}

/// Influencer status once `step` has been entered.
fn status_for_step(step: WorkflowStep) -> InfluencerStatus {
    match step {
        WorkflowStep::PartnershipTerms => InfluencerStatus::Negotiating,
        WorkflowStep::Shipping => InfluencerStatus::Agreed,
        WorkflowStep::Preparing => InfluencerStatus::ProductSelection,
        WorkflowStep::Contract => InfluencerStatus::ContractPending,
        WorkflowStep::Shipped => InfluencerStatus::Shipped,
    }
}

fn validate_coupon_code(code: &str) -> DomainResult<()> {
    if code.is_empty() {
        return Err(DomainError::invalid_value(
            WorkflowField::CouponCode.as_str(),
            "must not be empty",
        ));
    }
    let valid = code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(DomainError::invalid_value(
            WorkflowField::CouponCode.as_str(),
            format!("'{code}' may only contain A-Z, 0-9, '-' and '_'"),
        ));
    }
    Ok(())
}
