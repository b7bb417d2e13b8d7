//! Command-line parsing tests.

use clap::Parser;
use rust_decimal::Decimal;
use uuid::Uuid;

use partnerflow::cli::commands::influencer::InfluencerCommands;
use partnerflow::cli::commands::portal::PortalCommands;
use partnerflow::cli::commands::workflow::WorkflowCommands;
use partnerflow::cli::{Cli, Commands};

const ID: &str = "7f0c2a4e-8d1b-4c55-9e4a-3b2f1d0c9a88";

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("partnerflow").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn test_influencer_add() {
    let cli = parse(&["influencer", "add", "Ana Lima", "-e", "ana@example.com", "--tiktok", "@ana.tt"]);
    let Commands::Influencer(args) = cli.command else {
        panic!("expected influencer command");
    };
    match args.command {
        InfluencerCommands::Add { name, email, tiktok, instagram, .. } => {
            assert_eq!(name, "Ana Lima");
            assert_eq!(email.as_deref(), Some("ana@example.com"));
            assert_eq!(tiktok.as_deref(), Some("@ana.tt"));
            assert!(instagram.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_workflow_update_builds_address() {
    let cli = parse(&[
        "workflow", "update", ID,
        "--street", "Rua Augusta 1",
        "--postal-code", "1100-048",
        "--country", "Portugal",
        "--suggestion1", "Serum",
        "--agreed-price", "149.90",
    ]);
    let Commands::Workflow(args) = cli.command else {
        panic!("expected workflow command");
    };
    let WorkflowCommands::Update { id, fields } = args.command else {
        panic!("expected update");
    };
    assert_eq!(id, Uuid::parse_str(ID).unwrap());

    let update = fields.into_update();
    let address = update.shipping_address.expect("address");
    assert_eq!(address.street, "Rua Augusta 1");
    assert_eq!(address.country, "Portugal");
    assert_eq!(update.product_suggestion_1.as_deref(), Some("Serum"));
    assert_eq!(update.agreed_price, Some(Decimal::new(14990, 2)));
    assert!(update.tracking_url.is_none());
}

#[test]
fn test_partial_address_is_rejected() {
    let result = Cli::try_parse_from(["partnerflow", "workflow", "update", ID, "--street", "Rua 1"]);
    assert!(result.is_err());
}

#[test]
fn test_counter_accepts_negative_price_for_domain_validation() {
    let cli = parse(&["workflow", "counter", ID, "-5"]);
    let Commands::Workflow(args) = cli.command else {
        panic!("expected workflow command");
    };
    assert!(matches!(args.command, WorkflowCommands::Counter { price, .. } if price == Decimal::from(-5)));
}

#[test]
fn test_global_flags() {
    let cli = parse(&["workflow", "restart", ID, "--force", "--staff", "rita", "--json"]);
    assert!(cli.json);
    let Commands::Workflow(args) = cli.command else {
        panic!("expected workflow command");
    };
    assert_eq!(args.staff, "rita");
    assert!(matches!(args.command, WorkflowCommands::Restart { force: true, .. }));
}

#[test]
fn test_portal_propose_with_token() {
    let cli = parse(&["portal", "--token", "abc123", "propose", "180"]);
    let Commands::Portal(args) = cli.command else {
        panic!("expected portal command");
    };
    assert_eq!(args.token.as_deref(), Some("abc123"));
    assert!(matches!(args.command, PortalCommands::Propose { price } if price == Decimal::from(180)));
}

#[test]
fn test_invalid_workflow_id_is_rejected() {
    assert!(Cli::try_parse_from(["partnerflow", "workflow", "show", "not-a-uuid"]).is_err());
}
