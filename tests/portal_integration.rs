//! Integration tests for the influencer portal.

mod common;

use rust_decimal::Decimal;

use common::{register_ana, test_app};
use partnerflow::domain::models::fields::{WorkflowField, WorkflowFieldsUpdate};
use partnerflow::domain::models::influencer::InfluencerStatus;
use partnerflow::domain::models::workflow::{ShippingAddress, WorkflowStep};
use partnerflow::services::Actor;
use partnerflow::DomainError;

#[tokio::test]
async fn test_portal_drives_steps_one_and_two() {
    let app = test_app().await;
    let influencer = register_ana(&app).await;
    let token = app.influencers.issue_portal_token(influencer.id).await.unwrap();

    let view = app.portal.view(&token).await.unwrap();
    assert_eq!(view.step, None);

    let wf = app.engine.create(influencer.id, &Actor::staff("rita")).await.unwrap();
    app.engine
        .send_counterproposal(wf.id, Decimal::from(120), &Actor::staff("rita"))
        .await
        .unwrap();

    let view = app.portal.view(&token).await.unwrap();
    assert_eq!(view.step, Some(1));
    assert!(view.can_accept);
    assert_eq!(view.agreed_price, Some(Decimal::from(120)));

    let outcome = app.portal.accept_counterproposal(&token).await.unwrap();
    assert_eq!(outcome.influencer_status, InfluencerStatus::Agreed);
    // The acceptance email carries the portal link.
    let link = format!("{}/{token}", common::PORTAL_BASE_URL);
    assert!(app.email.sent().last().unwrap().body.contains(&link));

    let outcome = app.portal.submit(&token).await.unwrap();
    assert_eq!(outcome.workflow.current_step, WorkflowStep::Shipping);

    let update = WorkflowFieldsUpdate {
        shipping_address: Some(ShippingAddress::new("Rua Augusta 1", "1100-048", "Portugal")),
        product_suggestion_1: Some("Vitamin C serum".to_string()),
        ..Default::default()
    };
    app.portal.update(&token, &update).await.unwrap();

    // Once submitted, the shipping details freeze for the influencer.
    let view = app.portal.view(&token).await.unwrap();
    assert!(view
        .fields
        .iter()
        .filter(|f| f.field == WorkflowField::ShippingAddress)
        .all(|f| f.locked));

    let outcome = app.portal.submit(&token).await.unwrap();
    assert_eq!(outcome.workflow.current_step, WorkflowStep::Preparing);

    let err = app.portal.submit(&token).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
}

#[tokio::test]
async fn test_portal_cannot_touch_staff_fields() {
    let app = test_app().await;
    let influencer = register_ana(&app).await;
    let token = app.influencers.issue_portal_token(influencer.id).await.unwrap();
    app.engine.create(influencer.id, &Actor::staff("rita")).await.unwrap();

    let update = WorkflowFieldsUpdate {
        contact_email: Some("ana.new@example.com".to_string()),
        tracking_url: Some("https://track.example.com/x".to_string()),
        ..Default::default()
    };
    let err = app.portal.update(&token, &update).await.unwrap_err();
    assert!(matches!(err, DomainError::FieldLocked(f) if f == vec!["trackingUrl".to_string()]));

    // Nothing from the rejected call was written.
    let active = app.engine.get_active(influencer.id).await.unwrap().unwrap();
    assert_eq!(active.terms.contact_email, None);
}

#[tokio::test]
async fn test_portal_price_proposal_waits_for_review() {
    let app = test_app().await;
    let influencer = register_ana(&app).await;
    let token = app.influencers.issue_portal_token(influencer.id).await.unwrap();
    app.engine.create(influencer.id, &Actor::staff("rita")).await.unwrap();

    app.portal.propose_price(&token, Decimal::from(200)).await.unwrap();

    let view = app.portal.view(&token).await.unwrap();
    assert_eq!(view.influencer_status, InfluencerStatus::Analyzing);
    assert!(!view.can_accept);
    assert!(view.fields.iter().all(|f| f.locked));

    let err = app.portal.propose_price(&token, Decimal::from(190)).await.unwrap_err();
    assert!(matches!(err, DomainError::FieldLocked(_)));
}

#[tokio::test]
async fn test_reissued_token_revokes_the_old_one() {
    let app = test_app().await;
    let influencer = register_ana(&app).await;
    let old = app.influencers.issue_portal_token(influencer.id).await.unwrap();
    let new = app.influencers.issue_portal_token(influencer.id).await.unwrap();
    assert_ne!(old, new);

    assert!(matches!(
        app.portal.view(&old).await,
        Err(DomainError::PortalTokenInvalid)
    ));
    assert!(app.portal.view(&new).await.is_ok());
}

#[tokio::test]
async fn test_portal_without_active_workflow_rejects_mutations() {
    let app = test_app().await;
    let influencer = register_ana(&app).await;
    let token = app.influencers.issue_portal_token(influencer.id).await.unwrap();

    assert!(matches!(
        app.portal.submit(&token).await,
        Err(DomainError::ValidationFailed(_))
    ));
    assert!(matches!(
        app.portal.propose_price(&token, Decimal::from(50)).await,
        Err(DomainError::ValidationFailed(_))
    ));
}

#[tokio::test]
async fn test_portal_cannot_close_terms_on_its_own_price() {
    let app = test_app().await;
    let influencer = register_ana(&app).await;
    let token = app.influencers.issue_portal_token(influencer.id).await.unwrap();
    let wf = app.engine.create(influencer.id, &Actor::staff("rita")).await.unwrap();

    app.portal.propose_price(&token, Decimal::from(99_999)).await.unwrap();
    assert!(matches!(
        app.portal.accept_counterproposal(&token).await,
        Err(DomainError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        app.portal.submit(&token).await,
        Err(DomainError::InvalidStateTransition { .. })
    ));

    let stored = app.engine.get(wf.id).await.unwrap();
    assert_eq!(stored.current_step, WorkflowStep::PartnershipTerms);
    let view = app.portal.view(&token).await.unwrap();
    assert_eq!(view.influencer_status, InfluencerStatus::Analyzing);

    // Staff accepting the proposal unblocks the submit.
    app.engine
        .accept_counterproposal(wf.id, &Actor::staff("rita"))
        .await
        .unwrap();
    let outcome = app.portal.submit(&token).await.unwrap();
    assert_eq!(outcome.workflow.current_step, WorkflowStep::Shipping);
    assert_eq!(outcome.influencer_status, InfluencerStatus::Agreed);
    assert_eq!(outcome.workflow.terms.agreed_price, Some(Decimal::from(99_999)));
}
