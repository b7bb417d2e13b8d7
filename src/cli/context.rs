//! Wiring of adapters and services for CLI commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

use crate::adapters::commerce::{DisabledCouponProvisioner, HttpCouponProvisioner};
use crate::adapters::email::{HttpEmailSender, LogEmailSender};
use crate::adapters::sqlite::{
    initialize_from_config, SqliteInfluencerRepository, SqliteWorkflowRepository,
};
use crate::domain::models::config::Config;
use crate::domain::models::email_template::EmailTemplates;
use crate::domain::ports::{CouponProvisioner, EmailSender};
use crate::infrastructure::retry::RetryPolicy;
use crate::services::{InfluencerService, PortalService, WorkflowEngine};

pub type Engine = WorkflowEngine<SqliteWorkflowRepository, SqliteInfluencerRepository>;
pub type Portal = PortalService<SqliteWorkflowRepository, SqliteInfluencerRepository>;

/// Services backed by the configured database and providers.
pub struct AppContext {
    pub config: Config,
    pub engine: Arc<Engine>,
    pub influencers: InfluencerService<SqliteInfluencerRepository>,
    pub portal: Portal,
}

impl AppContext {
    /// Open the configured database and build every service.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = initialize_from_config(&config.database)
            .await
            .context("Failed to initialize database. Run 'partnerflow init' first.")?;
        Self::with_pool(config, pool)
    }

    /// Build services over an existing pool with the providers named in `config`.
    pub fn with_pool(config: &Config, pool: SqlitePool) -> Result<Self> {
        let email_sender = email_sender(config)?;
        let coupons = coupon_provisioner(config);
        Self::with_adapters(config, pool, email_sender, coupons)
    }

    /// Build services over explicit adapters.
    pub fn with_adapters(
        config: &Config,
        pool: SqlitePool,
        email_sender: Arc<dyn EmailSender>,
        coupons: Arc<dyn CouponProvisioner>,
    ) -> Result<Self> {
        let templates = match &config.email.templates_path {
            Some(path) => EmailTemplates::with_overrides_from_file(path)
                .with_context(|| format!("Failed to load email templates from {path}"))?,
            None => EmailTemplates::builtin(),
        };

        let workflows = Arc::new(SqliteWorkflowRepository::new(pool.clone()));
        let influencer_repo = Arc::new(SqliteInfluencerRepository::new(pool));

        let engine = Arc::new(
            WorkflowEngine::new(workflows, Arc::clone(&influencer_repo), email_sender, coupons)
                .with_templates(templates)
                .with_portal(config.portal.clone()),
        );

        Ok(Self {
            config: config.clone(),
            portal: PortalService::new(Arc::clone(&engine), Arc::clone(&influencer_repo)),
            influencers: InfluencerService::new(influencer_repo),
            engine,
        })
    }
}

fn email_sender(config: &Config) -> Result<Arc<dyn EmailSender>> {
    match config.email.provider.as_str() {
        "http" => {
            let sender = HttpEmailSender::from_config(&config.email, RetryPolicy::from(&config.retry))
                .context("Email provider 'http' requires email.base_url and email.api_key")?;
            debug!(provider = "http", "Email sender configured");
            Ok(Arc::new(sender))
        }
        _ => {
            debug!(provider = "log", "Email sender configured");
            Ok(Arc::new(LogEmailSender::new()))
        }
    }
}

fn coupon_provisioner(config: &Config) -> Arc<dyn CouponProvisioner> {
    match HttpCouponProvisioner::from_config(&config.commerce, RetryPolicy::from(&config.retry)) {
        Some(provisioner) => Arc::new(provisioner),
        None => Arc::new(DisabledCouponProvisioner),
    }
}
