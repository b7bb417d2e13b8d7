//! CLI type definitions
//!
//! Top-level clap structures. Each subcommand group lives in `commands/`.

use clap::{Parser, Subcommand};

use crate::cli::commands::influencer::InfluencerArgs;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::portal::PortalArgs;
use crate::cli::commands::workflow::WorkflowArgs;

#[derive(Parser, Debug)]
#[command(name = "partnerflow")]
#[command(about = "Partnerflow - influencer partnership workflows", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize partnerflow configuration and database
    Init(InitArgs),

    /// Register and look up influencers
    Influencer(InfluencerArgs),

    /// Drive partnership workflows (staff)
    Workflow(WorkflowArgs),

    /// Act on a workflow as the influencer, using a portal token
    Portal(PortalArgs),
}
