//! Portal CLI commands: act as the influencer through a portal token.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cli::commands::workflow::{FieldArgs, TransitionOutput};
use crate::cli::context::AppContext;
use crate::cli::display::{
    action_success, colorize_status, list_table, lock_marker, or_dash, output, price,
    CommandOutput,
};
use crate::domain::models::config::Config;
use crate::domain::models::workflow::PartnershipWorkflow;
use crate::services::PortalView;

#[derive(Args, Debug)]
pub struct PortalArgs {
    /// Portal token issued with `influencer token`
    #[arg(long, env = "PARTNERFLOW_PORTAL_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: PortalCommands,
}

#[derive(Subcommand, Debug)]
pub enum PortalCommands {
    /// Show the current step and editable fields
    View,
    /// Fill in contact or shipping fields
    Update {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Submit step 1 or step 2
    Submit,
    /// Accept the brand's counter-proposal
    Accept,
    /// Propose a different price
    Propose {
        /// Proposed price
        #[arg(allow_negative_numbers = true)]
        price: Decimal,
    },
}

#[derive(Debug, Serialize)]
pub struct PortalViewOutput {
    #[serde(flatten)]
    pub view: PortalView,
}

impl CommandOutput for PortalViewOutput {
    fn to_human(&self) -> String {
        let view = &self.view;
        let mut lines = vec![format!(
            "Hi {}! Status: {}",
            view.influencer_name,
            colorize_status(view.influencer_status.as_str())
        )];

        let (Some(step), Some(label)) = (view.step, view.step_label) else {
            lines.push("No partnership is in progress.".to_string());
            return lines.join("\n");
        };

        lines.push(format!("Step {step}: {label}"));
        lines.push(format!("Price: {}", price(view.agreed_price)));
        if view.can_accept {
            lines.push("A price proposal is waiting: run `portal accept` or `portal propose <price>`.".to_string());
        }

        let mut table = list_table(&["field", "value", "state"]);
        for field in &view.fields {
            table.add_row(vec![
                field.field.to_string(),
                or_dash(field.value.as_deref()).to_string(),
                lock_marker(field.locked).to_string(),
            ]);
        }
        lines.push(table.to_string());
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct PortalUpdateOutput {
    pub message: String,
    pub workflow: PartnershipWorkflow,
}

impl CommandOutput for PortalUpdateOutput {
    fn to_human(&self) -> String {
        action_success(&self.message)
    }
}

pub async fn execute(args: PortalArgs, config: &Config, json_mode: bool) -> Result<()> {
    let Some(token) = args.token else {
        bail!("A portal token is required (--token or PARTNERFLOW_PORTAL_TOKEN)");
    };
    let ctx = AppContext::open(config).await?;
    let portal = &ctx.portal;

    match args.command {
        PortalCommands::View => {
            let view = portal.view(&token).await?;
            output(&PortalViewOutput { view }, json_mode);
        }
        PortalCommands::Update { fields } => {
            let update = fields.into_update();
            if update.is_empty() {
                bail!("Nothing to update; pass at least one field flag");
            }
            let workflow = portal.update(&token, &update).await?;
            output(
                &PortalUpdateOutput {
                    message: "Your details were saved".to_string(),
                    workflow,
                },
                json_mode,
            );
        }
        PortalCommands::Submit => {
            let outcome = portal.submit(&token).await?;
            output(&TransitionOutput::advanced(outcome), json_mode);
        }
        PortalCommands::Accept => {
            let outcome = portal.accept_counterproposal(&token).await?;
            output(&TransitionOutput::new("Price accepted", outcome), json_mode);
        }
        PortalCommands::Propose { price: amount } => {
            let workflow = portal.propose_price(&token, amount).await?;
            output(
                &PortalUpdateOutput {
                    message: format!(
                        "Proposed {}; the brand will review it",
                        amount.normalize()
                    ),
                    workflow,
                },
                json_mode,
            );
        }
    }

    Ok(())
}
