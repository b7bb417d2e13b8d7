//! Database tests: migrations and the storage-level invariants.

mod common;

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use partnerflow::adapters::commerce::MockCouponProvisioner;
use partnerflow::adapters::email::HttpEmailSender;
use partnerflow::adapters::sqlite::{
    all_embedded_migrations, database_url, initialize_database, Migrator,
    SqliteInfluencerRepository, SqliteWorkflowRepository,
};
use partnerflow::domain::models::influencer::Influencer;
use partnerflow::domain::models::workflow::PartnershipWorkflow;
use partnerflow::infrastructure::retry::RetryPolicy;
use partnerflow::services::{Actor, InfluencerService, WorkflowEngine};
use partnerflow::{InfluencerRepository, WorkflowRepository};

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let (_dir, path) = common::temp_db_path();
    let url = database_url(&path.to_string_lossy());

    let pool = initialize_database(&url, None).await.expect("first open");
    let migrator = Migrator::new(pool.clone());
    let version = migrator.get_current_version().await.unwrap();
    assert!(version >= 1);

    let applied = migrator
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .unwrap();
    assert_eq!(applied, 0, "nothing left to apply");
    pool.close().await;

    let reopened = initialize_database(&url, None).await.expect("second open");
    let migrator = Migrator::new(reopened);
    assert_eq!(migrator.get_current_version().await.unwrap(), version);
}

#[tokio::test]
async fn test_storage_enforces_one_active_workflow() {
    let (_dir, path) = common::temp_db_path();
    let pool = initialize_database(&database_url(&path.to_string_lossy()), None)
        .await
        .unwrap();
    let influencers = SqliteInfluencerRepository::new(pool.clone());
    let workflows = SqliteWorkflowRepository::new(pool);

    let influencer = Influencer::new(common::ana());
    influencers.save(&influencer).await.unwrap();

    workflows
        .save(&PartnershipWorkflow::new(influencer.id))
        .await
        .unwrap();

    // Bypassing the engine still cannot produce a second active record.
    let result = workflows
        .save(&PartnershipWorkflow::new(influencer.id))
        .await;
    assert!(result.is_err());
    assert_eq!(workflows.list_by_influencer(influencer.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_workflow_survives_reopen_with_http_email() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/emails")
        .match_header("authorization", "Bearer re_test")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "to": ["ana@example.com"],
            "subject": "Welcome aboard, Ana Lima!"
        })))
        .with_status(200)
        .with_body(r#"{"id":"msg_1"}"#)
        .expect(1)
        .create_async()
        .await;

    let (_dir, path) = common::temp_db_path();
    let url = database_url(&path.to_string_lossy());
    let retry = RetryPolicy::new(1, Duration::from_millis(1), Duration::from_millis(5));

    let workflow_id = {
        let pool = initialize_database(&url, None).await.unwrap();
        let influencer_repo = Arc::new(SqliteInfluencerRepository::new(pool.clone()));
        let engine = WorkflowEngine::new(
            Arc::new(SqliteWorkflowRepository::new(pool.clone())),
            Arc::clone(&influencer_repo),
            Arc::new(HttpEmailSender::new(
                server.url(),
                "re_test",
                "partners@brand.example",
                10,
                retry,
            )),
            Arc::new(MockCouponProvisioner::new()),
        );
        let influencer = InfluencerService::new(influencer_repo)
            .register(common::ana())
            .await
            .unwrap();

        let wf = engine.create(influencer.id, &Actor::staff("rita")).await.unwrap();
        let outcome = engine.advance(wf.id, &Actor::staff("rita")).await.unwrap();
        assert!(outcome.notification.is_sent());
        pool.close().await;
        wf.id
    };

    let pool = initialize_database(&url, None).await.unwrap();
    let stored = SqliteWorkflowRepository::new(pool)
        .get(workflow_id)
        .await
        .unwrap()
        .expect("workflow persisted");
    assert_eq!(stored.current_step.number(), 2);
    assert_eq!(stored.emails.len(), 1);
    assert_eq!(stored.emails[0].template_key, "step_1_without_price");
    mock.assert_async().await;
}
