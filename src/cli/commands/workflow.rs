//! Workflow CLI commands (staff side).

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::display::{
    action_failure, action_success, colorize_status, list_table, lock_marker,
    notification_marker, or_dash, output, price, render_list, short_id, timestamp,
    CommandOutput, DetailView,
};
use crate::domain::models::config::Config;
use crate::domain::models::field_lock::FieldLockState;
use crate::domain::models::fields::WorkflowFieldsUpdate;
use crate::domain::models::workflow::{PartnershipWorkflow, ShippingAddress};
use crate::services::{Actor, NotificationOutcome, TransitionOutcome};

#[derive(Args, Debug)]
pub struct WorkflowArgs {
    /// Staff member name recorded on emails and in logs
    #[arg(long, global = true, env = "PARTNERFLOW_STAFF", default_value = "staff")]
    pub staff: String,

    #[command(subcommand)]
    pub command: WorkflowCommands,
}

#[derive(Subcommand, Debug)]
pub enum WorkflowCommands {
    /// Open a new workflow for an influencer
    Create {
        /// Influencer ID
        influencer_id: Uuid,
    },
    /// Show a workflow
    Show {
        /// Workflow ID
        id: Uuid,
    },
    /// List an influencer's workflows, newest first
    List {
        /// Influencer ID
        influencer_id: Uuid,
    },
    /// Write workflow fields
    Update {
        /// Workflow ID
        id: Uuid,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Advance to the next step once its required fields are present
    Advance {
        /// Workflow ID
        id: Uuid,
    },
    /// Send a counter-proposal price to the influencer
    Counter {
        /// Workflow ID
        id: Uuid,
        /// Proposed price
        #[arg(allow_negative_numbers = true)]
        price: Decimal,
    },
    /// Accept the price the influencer proposed
    Accept {
        /// Workflow ID
        id: Uuid,
    },
    /// Create the influencer's discount code on the store (step 3)
    Coupon {
        /// Workflow ID
        id: Uuid,
        /// Discount code (A-Z, 0-9, '-' and '_')
        code: String,
    },
    /// Replace the workflow with a fresh one at step 1
    Restart {
        /// Workflow ID
        id: Uuid,
        /// Restart even though the workflow is mid-way
        #[arg(short, long)]
        force: bool,
    },
    /// Cancel the workflow
    Cancel {
        /// Workflow ID
        id: Uuid,
    },
    /// Show which fields are currently locked
    Locks {
        /// Workflow ID
        id: Uuid,
    },
}

/// Field flags shared by `workflow update` and `portal update`.
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Agreed price
    #[arg(long)]
    pub agreed_price: Option<Decimal>,
    /// Contact email
    #[arg(long)]
    pub contact_email: Option<String>,
    /// Contact Instagram handle
    #[arg(long)]
    pub contact_instagram: Option<String>,
    /// Contact WhatsApp number
    #[arg(long)]
    pub contact_whatsapp: Option<String>,
    /// Shipping street
    #[arg(long, requires_all = ["postal_code", "country"])]
    pub street: Option<String>,
    /// Shipping postal code
    #[arg(long, requires_all = ["street", "country"])]
    pub postal_code: Option<String>,
    /// Shipping country
    #[arg(long, requires_all = ["street", "postal_code"])]
    pub country: Option<String>,
    /// First product suggestion
    #[arg(long)]
    pub suggestion1: Option<String>,
    /// Second product suggestion
    #[arg(long)]
    pub suggestion2: Option<String>,
    /// Third product suggestion
    #[arg(long)]
    pub suggestion3: Option<String>,
    /// Selected product URL
    #[arg(long)]
    pub product_url: Option<String>,
    /// Discount code already created on the store
    #[arg(long)]
    pub coupon_code: Option<String>,
    /// Whether the contract is signed
    #[arg(long)]
    pub contract_signed: Option<bool>,
    /// Signed contract URL
    #[arg(long)]
    pub contract_url: Option<String>,
    /// Shipment tracking URL
    #[arg(long)]
    pub tracking_url: Option<String>,
}

impl FieldArgs {
    pub fn into_update(self) -> WorkflowFieldsUpdate {
        let shipping_address = match (self.street, self.postal_code, self.country) {
            (Some(street), Some(postal_code), Some(country)) => {
                Some(ShippingAddress::new(street, postal_code, country))
            }
            _ => None,
        };
        WorkflowFieldsUpdate {
            agreed_price: self.agreed_price,
            contact_email: self.contact_email,
            contact_instagram: self.contact_instagram,
            contact_whatsapp: self.contact_whatsapp,
            shipping_address,
            product_suggestion_1: self.suggestion1,
            product_suggestion_2: self.suggestion2,
            product_suggestion_3: self.suggestion3,
            selected_product_url: self.product_url,
            coupon_code: self.coupon_code,
            contract_signed: self.contract_signed,
            contract_url: self.contract_url,
            tracking_url: self.tracking_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowOutput {
    #[serde(flatten)]
    pub workflow: PartnershipWorkflow,
}

impl CommandOutput for WorkflowOutput {
    fn to_human(&self) -> String {
        let wf = &self.workflow;
        let address = wf.shipping.shipping_address.as_ref().map(ToString::to_string);
        let mut view = DetailView::new(&format!("Workflow {}", wf.id))
            .field("Influencer", &wf.influencer_id.to_string())
            .field("Step", &wf.current_step.to_string())
            .field("Status", &colorize_status(wf.status.as_str()).to_string())
            .field_opt(
                "Superseded by",
                wf.superseded_by.map(|id| id.to_string()).as_deref(),
            )
            .section("Terms")
            .field("Price", &price(wf.terms.agreed_price))
            .field("Email", or_dash(wf.terms.contact_email.as_deref()))
            .field("Instagram", or_dash(wf.terms.contact_instagram.as_deref()))
            .field("WhatsApp", or_dash(wf.terms.contact_whatsapp.as_deref()))
            .section("Shipping")
            .field("Address", or_dash(address.as_deref()))
            .field("Suggestion 1", or_dash(wf.shipping.product_suggestion_1.as_deref()))
            .field("Suggestion 2", or_dash(wf.shipping.product_suggestion_2.as_deref()))
            .field("Suggestion 3", or_dash(wf.shipping.product_suggestion_3.as_deref()))
            .section("Fulfilment")
            .field("Product", or_dash(wf.preparation.selected_product_url.as_deref()))
            .field("Coupon", or_dash(wf.preparation.coupon_code.as_deref()))
            .field("Contract", if wf.contract.contract_signed { "signed" } else { "not signed" })
            .field_opt("Contract URL", wf.contract.contract_url.as_deref())
            .field("Tracking", or_dash(wf.shipment.tracking_url.as_deref()));

        if !wf.emails.is_empty() {
            view = view.section("Emails");
            for email in &wf.emails {
                view = view.item(&format!(
                    "{} step {} {} by {}: {}",
                    timestamp(&email.sent_at),
                    email.step.number(),
                    email.template_key,
                    email.sent_by,
                    email.subject
                ));
            }
        }

        view.render()
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowListOutput {
    pub workflows: Vec<PartnershipWorkflow>,
    pub total: usize,
}

impl CommandOutput for WorkflowListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "step", "status", "price", "emails", "created"]);
        for wf in &self.workflows {
            let id = wf.id.to_string();
            table.add_row(vec![
                short_id(&id).to_string(),
                wf.current_step.to_string(),
                colorize_status(wf.status.as_str()).to_string(),
                price(wf.terms.agreed_price),
                wf.emails.len().to_string(),
                timestamp(&wf.created_at),
            ]);
        }
        render_list("workflow", &table, self.total)
    }
}

#[derive(Debug, Serialize)]
pub struct TransitionOutput {
    pub message: String,
    #[serde(flatten)]
    pub outcome: TransitionOutcome,
}

impl TransitionOutput {
    pub fn new(message: impl Into<String>, outcome: TransitionOutcome) -> Self {
        Self {
            message: message.into(),
            outcome,
        }
    }

    /// Message for a step advance.
    pub fn advanced(outcome: TransitionOutcome) -> Self {
        let wf = &outcome.workflow;
        let message = match outcome.left_step {
            Some(left) if wf.is_terminal() => format!("Workflow completed after step {left}"),
            Some(left) => format!("Advanced from step {left} to step {}", wf.current_step),
            None => format!("Workflow at step {}", wf.current_step),
        };
        Self::new(message, outcome)
    }
}

impl CommandOutput for TransitionOutput {
    fn to_human(&self) -> String {
        let status_line = format!(
            "Influencer status: {}",
            colorize_status(self.outcome.influencer_status.as_str())
        );
        let email_line = match &self.outcome.notification {
            NotificationOutcome::Sent { to, template_key, .. } => {
                format!("Email {} to {to} ({template_key})", notification_marker("sent"))
            }
            NotificationOutcome::Failed { template_key, reason } => format!(
                "Email {} ({template_key}): {reason}; the change was kept",
                notification_marker("failed")
            ),
            NotificationOutcome::Skipped { template_key, reason } => {
                format!("Email {} ({template_key}): {reason}", notification_marker("skipped"))
            }
        };
        [action_success(&self.message), status_line, email_line].join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct LocksOutput {
    pub workflow_id: Uuid,
    pub fields: Vec<FieldLockState>,
}

impl CommandOutput for LocksOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["field", "state"]);
        for state in &self.fields {
            table.add_row(vec![
                state.field.to_string(),
                lock_marker(state.locked).to_string(),
            ]);
        }
        format!("Field locks for workflow {}:\n{table}", short_id(&self.workflow_id.to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowActionOutput {
    pub success: bool,
    pub message: String,
    pub workflow: PartnershipWorkflow,
}

impl CommandOutput for WorkflowActionOutput {
    fn to_human(&self) -> String {
        if self.success {
            action_success(&self.message)
        } else {
            action_failure(&self.message)
        }
    }
}

fn action(message: impl Into<String>, workflow: PartnershipWorkflow) -> WorkflowActionOutput {
    WorkflowActionOutput {
        success: true,
        message: message.into(),
        workflow,
    }
}

pub async fn execute(args: WorkflowArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;
    let actor = Actor::staff(args.staff);
    let engine = &ctx.engine;

    match args.command {
        WorkflowCommands::Create { influencer_id } => {
            let workflow = engine.create(influencer_id, &actor).await?;
            output(
                &action(format!("Created workflow {} at step 1", workflow.id), workflow),
                json_mode,
            );
        }
        WorkflowCommands::Show { id } => {
            let workflow = engine.get(id).await?;
            output(&WorkflowOutput { workflow }, json_mode);
        }
        WorkflowCommands::List { influencer_id } => {
            let workflows = engine.list_for_influencer(influencer_id).await?;
            let total = workflows.len();
            output(&WorkflowListOutput { workflows, total }, json_mode);
        }
        WorkflowCommands::Update { id, fields } => {
            let update = fields.into_update();
            if update.is_empty() {
                bail!("Nothing to update; pass at least one field flag");
            }
            let names: Vec<String> = update.fields().iter().map(ToString::to_string).collect();
            let workflow = engine.update_fields(id, &update, &actor).await?;
            output(&action(format!("Updated {}", names.join(", ")), workflow), json_mode);
        }
        WorkflowCommands::Advance { id } => {
            let outcome = engine.advance(id, &actor).await?;
            output(&TransitionOutput::advanced(outcome), json_mode);
        }
        WorkflowCommands::Counter { id, price: amount } => {
            let outcome = engine.send_counterproposal(id, amount, &actor).await?;
            output(
                &TransitionOutput::new(
                    format!("Counter-proposal of {} sent", amount.normalize()),
                    outcome,
                ),
                json_mode,
            );
        }
        WorkflowCommands::Accept { id } => {
            let outcome = engine.accept_counterproposal(id, &actor).await?;
            output(&TransitionOutput::new("Price accepted", outcome), json_mode);
        }
        WorkflowCommands::Coupon { id, code } => {
            let workflow = engine.create_coupon(id, &code, &actor).await?;
            let created = workflow.preparation.coupon_code.clone().unwrap_or(code);
            output(&action(format!("Coupon {created} created"), workflow), json_mode);
        }
        WorkflowCommands::Restart { id, force } => {
            let workflow = engine.restart(id, force, &actor).await?;
            output(
                &action(format!("Workflow {id} replaced by {}", workflow.id), workflow),
                json_mode,
            );
        }
        WorkflowCommands::Cancel { id } => {
            let workflow = engine.cancel(id, &actor).await?;
            output(&action(format!("Workflow {id} cancelled"), workflow), json_mode);
        }
        WorkflowCommands::Locks { id } => {
            let fields = engine.field_locks(id).await?;
            output(&LocksOutput { workflow_id: id, fields }, json_mode);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_args_build_address_only_when_complete() {
        let args = FieldArgs {
            street: Some("Rua Augusta 1".to_string()),
            postal_code: Some("1100-048".to_string()),
            country: Some("Portugal".to_string()),
            suggestion1: Some("Serum".to_string()),
            ..Default::default()
        };
        let update = args.into_update();
        assert_eq!(
            update.shipping_address,
            Some(ShippingAddress::new("Rua Augusta 1", "1100-048", "Portugal"))
        );
        assert_eq!(update.product_suggestion_1.as_deref(), Some("Serum"));

        assert!(FieldArgs::default().into_update().is_empty());
    }
}
