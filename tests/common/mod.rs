//! Common test utilities for integration tests
//!
//! Shared fixtures used across the integration suites.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use partnerflow::adapters::commerce::MockCouponProvisioner;
use partnerflow::adapters::email::MockEmailSender;
use partnerflow::adapters::sqlite::{
    create_migrated_test_pool, SqliteInfluencerRepository, SqliteWorkflowRepository,
};
use partnerflow::domain::models::config::PortalConfig;
use partnerflow::domain::models::influencer::{Influencer, NewInfluencer};
use partnerflow::services::{InfluencerService, PortalService, WorkflowEngine};
use tempfile::TempDir;

pub const PORTAL_BASE_URL: &str = "https://partners.example.com/portal";

pub type Engine = WorkflowEngine<SqliteWorkflowRepository, SqliteInfluencerRepository>;
pub type Portal = PortalService<SqliteWorkflowRepository, SqliteInfluencerRepository>;

/// Services over one in-memory database, with recording adapters.
pub struct TestApp {
    pub engine: Arc<Engine>,
    pub portal: Portal,
    pub influencers: InfluencerService<SqliteInfluencerRepository>,
    pub email: MockEmailSender,
    pub coupons: MockCouponProvisioner,
}

pub async fn test_app() -> TestApp {
    test_app_with(MockEmailSender::new(), MockCouponProvisioner::new()).await
}

pub async fn test_app_with(email: MockEmailSender, coupons: MockCouponProvisioner) -> TestApp {
    let pool = create_migrated_test_pool().await.expect("Failed to create test pool");
    let workflows = Arc::new(SqliteWorkflowRepository::new(pool.clone()));
    let influencer_repo = Arc::new(SqliteInfluencerRepository::new(pool));
    let engine = Arc::new(WorkflowEngine::new(
        workflows,
        Arc::clone(&influencer_repo),
        Arc::new(email.clone()),
        Arc::new(coupons.clone()),
    )
    .with_portal(PortalConfig {
        base_url: Some(PORTAL_BASE_URL.to_string()),
    }));

    TestApp {
        portal: PortalService::new(Arc::clone(&engine), Arc::clone(&influencer_repo)),
        influencers: InfluencerService::new(influencer_repo),
        engine,
        email,
        coupons,
    }
}

/// A fully reachable influencer profile.
pub fn ana() -> NewInfluencer {
    NewInfluencer {
        name: "Ana Lima".to_string(),
        email: Some("ana@example.com".to_string()),
        instagram_handle: Some("@ana".to_string()),
        tiktok_handle: Some("@ana.tt".to_string()),
        whatsapp_phone: Some("+351911111111".to_string()),
    }
}

pub async fn register_ana(app: &TestApp) -> Influencer {
    app.influencers
        .register(ana())
        .await
        .expect("Failed to register influencer")
}

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Path to a SQLite database file in a temporary directory.
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let db_path = dir.path().join("test.db");
    (dir, db_path)
}
