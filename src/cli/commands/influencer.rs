//! Influencer CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::display::{
    action_success, colorize_status, list_table, or_dash, output, render_list, short_id, timestamp,
    truncate, CommandOutput, DetailView,
};
use crate::domain::models::config::Config;
use crate::domain::models::influencer::{Influencer, NewInfluencer};

#[derive(Args, Debug)]
pub struct InfluencerArgs {
    #[command(subcommand)]
    pub command: InfluencerCommands,
}

#[derive(Subcommand, Debug)]
pub enum InfluencerCommands {
    /// Register a new influencer
    Add {
        /// Display name
        name: String,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
        /// Instagram handle
        #[arg(long)]
        instagram: Option<String>,
        /// TikTok handle
        #[arg(long)]
        tiktok: Option<String>,
        /// WhatsApp phone number
        #[arg(long)]
        whatsapp: Option<String>,
    },
    /// List influencers
    List,
    /// Show influencer details
    Show {
        /// Influencer ID
        id: Uuid,
    },
    /// Issue a new portal token, replacing the previous one
    Token {
        /// Influencer ID
        id: Uuid,
    },
}

#[derive(Debug, Serialize)]
pub struct InfluencerOutput {
    #[serde(flatten)]
    pub influencer: Influencer,
    pub has_portal_token: bool,
}

impl From<Influencer> for InfluencerOutput {
    fn from(influencer: Influencer) -> Self {
        Self {
            has_portal_token: influencer.portal_token.is_some(),
            influencer,
        }
    }
}

impl CommandOutput for InfluencerOutput {
    fn to_human(&self) -> String {
        let i = &self.influencer;
        DetailView::new(&format!("Influencer {}", i.name))
            .field("ID", &i.id.to_string())
            .field("Status", &colorize_status(i.status.as_str()).to_string())
            .field("Email", or_dash(i.email.as_deref()))
            .field("Instagram", or_dash(i.instagram_handle.as_deref()))
            .field("TikTok", or_dash(i.tiktok_handle.as_deref()))
            .field("WhatsApp", or_dash(i.whatsapp_phone.as_deref()))
            .field("Portal", if self.has_portal_token { "token issued" } else { "no token" })
            .field("Created", &timestamp(&i.created_at))
            .render()
    }
}

#[derive(Debug, Serialize)]
pub struct InfluencerListOutput {
    pub influencers: Vec<InfluencerOutput>,
    pub total: usize,
}

impl CommandOutput for InfluencerListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "status", "email", "instagram"]);
        for entry in &self.influencers {
            let i = &entry.influencer;
            let id = i.id.to_string();
            table.add_row(vec![
                short_id(&id).to_string(),
                truncate(&i.name, 24),
                colorize_status(i.status.as_str()).to_string(),
                or_dash(i.email.as_deref()).to_string(),
                or_dash(i.instagram_handle.as_deref()).to_string(),
            ]);
        }
        render_list("influencer", &table, self.total)
    }
}

#[derive(Debug, Serialize)]
pub struct TokenOutput {
    pub influencer_id: Uuid,
    pub token: String,
    pub portal_url: Option<String>,
}

impl CommandOutput for TokenOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            action_success("Portal token issued; the previous token no longer works."),
            format!("Token: {}", self.token),
        ];
        if let Some(url) = &self.portal_url {
            lines.push(format!("Portal: {url}"));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InfluencerArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;

    match args.command {
        InfluencerCommands::Add {
            name,
            email,
            instagram,
            tiktok,
            whatsapp,
        } => {
            let influencer = ctx
                .influencers
                .register(NewInfluencer {
                    name,
                    email,
                    instagram_handle: instagram,
                    tiktok_handle: tiktok,
                    whatsapp_phone: whatsapp,
                })
                .await?;
            output(&InfluencerOutput::from(influencer), json_mode);
        }
        InfluencerCommands::List => {
            let influencers: Vec<InfluencerOutput> = ctx
                .influencers
                .list()
                .await?
                .into_iter()
                .map(InfluencerOutput::from)
                .collect();
            let total = influencers.len();
            output(&InfluencerListOutput { influencers, total }, json_mode);
        }
        InfluencerCommands::Show { id } => {
            let influencer = ctx.influencers.get(id).await?;
            output(&InfluencerOutput::from(influencer), json_mode);
        }
        InfluencerCommands::Token { id } => {
            let token = ctx.influencers.issue_portal_token(id).await?;
            let portal_url = ctx.config.portal.url_for(&token);
            output(
                &TokenOutput {
                    influencer_id: id,
                    token,
                    portal_url,
                },
                json_mode,
            );
        }
    }

    Ok(())
}
