//! Required fields per step.
//!
//! `advance` refuses to leave a step until everything listed here is present.
//! Missing fields are collected exhaustively so callers can show all of them.

use rust_decimal::Decimal;

use super::influencer::Influencer;
use super::workflow::{PartnershipWorkflow, WorkflowStep};

/// Name of every required field still missing for the workflow's current step.
pub fn missing_fields(workflow: &PartnershipWorkflow, influencer: &Influencer) -> Vec<String> {
    let mut missing = Vec::new();
    let mut require = |present: bool, name: &str| {
        if !present {
            missing.push(name.to_string());
        }
    };

    match workflow.current_step {
        WorkflowStep::PartnershipTerms => {
            let terms = &workflow.terms;
            require(!influencer.name.trim().is_empty(), "name");
            require(
                terms.contact_email.is_some() || influencer.email.is_some(),
                "email",
            );
            require(
                terms.contact_instagram.is_some() || influencer.instagram_handle.is_some(),
                "instagram",
            );
            require(influencer.tiktok_handle.is_some(), "tiktok");
            require(
                terms.contact_whatsapp.is_some() || influencer.whatsapp_phone.is_some(),
                "whatsapp",
            );
            // Only checked when a price was proposed at all.
            if let Some(price) = terms.agreed_price {
                require(price > Decimal::ZERO, "agreedPrice");
            }
        }
        WorkflowStep::Shipping => {
            let shipping = &workflow.shipping;
            require(
                shipping
                    .shipping_address
                    .as_ref()
                    .is_some_and(|a| a.is_complete()),
                "shippingAddress",
            );
            require(shipping.product_suggestion_1.is_some(), "productSuggestion1");
        }
        WorkflowStep::Preparing => {
            let prep = &workflow.preparation;
            require(prep.selected_product_url.is_some(), "selectedProductUrl");
            require(prep.coupon_code.is_some(), "couponCode");
        }
        WorkflowStep::Contract => {
            require(workflow.contract.contract_signed, "contractSigned");
        }
        WorkflowStep::Shipped => {
            require(workflow.shipment.tracking_url.is_some(), "trackingUrl");
            require(workflow.preparation.coupon_code.is_some(), "couponCode");
        }
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::influencer::NewInfluencer;
    use crate::domain::models::workflow::ShippingAddress;
    use uuid::Uuid;

    fn influencer() -> Influencer {
        Influencer::new(NewInfluencer {
            name: "Ana Lima".to_string(),
            tiktok_handle: Some("@ana.tt".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_step_one_reports_every_missing_contact() {
        let wf = PartnershipWorkflow::new(Uuid::new_v4());
        assert_eq!(missing_fields(&wf, &influencer()), vec!["email", "instagram", "whatsapp"]);
    }

    #[test]
    fn test_step_one_uses_profile_fallbacks() {
        let wf = PartnershipWorkflow::new(Uuid::new_v4());
        let mut profile = influencer();
        profile.email = Some("ana@example.com".to_string());
        profile.instagram_handle = Some("@ana".to_string());
        profile.whatsapp_phone = Some("+351911111111".to_string());
        assert!(missing_fields(&wf, &profile).is_empty());

        profile.tiktok_handle = None;
        assert_eq!(missing_fields(&wf, &profile), vec!["tiktok"]);
    }

    #[test]
    fn test_step_one_zero_price_is_missing() {
        let mut wf = PartnershipWorkflow::new(Uuid::new_v4());
        wf.terms.contact_email = Some("a@b.com".to_string());
        wf.terms.contact_instagram = Some("@x".to_string());
        wf.terms.contact_whatsapp = Some("+351900000000".to_string());
        wf.terms.agreed_price = Some(Decimal::ZERO);
        assert_eq!(missing_fields(&wf, &influencer()), vec!["agreedPrice"]);
    }

    #[test]
    fn test_step_two_reports_both_fields() {
        let mut wf = PartnershipWorkflow::new(Uuid::new_v4());
        wf.current_step = WorkflowStep::Shipping;
        assert_eq!(
            missing_fields(&wf, &influencer()),
            vec!["shippingAddress", "productSuggestion1"]
        );

        wf.shipping.shipping_address = Some(ShippingAddress::new("Rua 1", "", "PT"));
        wf.shipping.product_suggestion_1 = Some("Serum".to_string());
        assert_eq!(missing_fields(&wf, &influencer()), vec!["shippingAddress"]);
    }

    #[test]
    fn test_later_steps() {
        let mut wf = PartnershipWorkflow::new(Uuid::new_v4());
        wf.current_step = WorkflowStep::Preparing;
        assert_eq!(
            missing_fields(&wf, &influencer()),
            vec!["selectedProductUrl", "couponCode"]
        );

        wf.current_step = WorkflowStep::Contract;
        assert_eq!(missing_fields(&wf, &influencer()), vec!["contractSigned"]);
        wf.contract.contract_signed = true;
        assert!(missing_fields(&wf, &influencer()).is_empty());

        wf.current_step = WorkflowStep::Shipped;
        wf.preparation.coupon_code = Some("ANA10".to_string());
        assert_eq!(missing_fields(&wf, &influencer()), vec!["trackingUrl"]);
    }
}
