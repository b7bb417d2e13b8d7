//! Writable workflow fields and partial updates.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::influencer::non_blank;
use super::workflow::{PartnershipWorkflow, ShippingAddress, WorkflowStep};
use crate::domain::errors::{DomainError, DomainResult};

/// Every field a caller may write through `update_fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowField {
    AgreedPrice,
    ContactEmail,
    ContactInstagram,
    ContactWhatsapp,
    ShippingAddress,
    ProductSuggestion1,
    ProductSuggestion2,
    ProductSuggestion3,
    SelectedProductUrl,
    CouponCode,
    ContractSigned,
    ContractUrl,
    TrackingUrl,
}

/// Lock-rule family a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Price,
    Contact,
    Shipping,
    Other,
}

impl WorkflowField {
    pub const ALL: [Self; 13] = [
        Self::AgreedPrice,
        Self::ContactEmail,
        Self::ContactInstagram,
        Self::ContactWhatsapp,
        Self::ShippingAddress,
        Self::ProductSuggestion1,
        Self::ProductSuggestion2,
        Self::ProductSuggestion3,
        Self::SelectedProductUrl,
        Self::CouponCode,
        Self::ContractSigned,
        Self::ContractUrl,
        Self::TrackingUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgreedPrice => "agreedPrice",
            Self::ContactEmail => "contactEmail",
            Self::ContactInstagram => "contactInstagram",
            Self::ContactWhatsapp => "contactWhatsapp",
            Self::ShippingAddress => "shippingAddress",
            Self::ProductSuggestion1 => "productSuggestion1",
            Self::ProductSuggestion2 => "productSuggestion2",
            Self::ProductSuggestion3 => "productSuggestion3",
            Self::SelectedProductUrl => "selectedProductUrl",
            Self::CouponCode => "couponCode",
            Self::ContractSigned => "contractSigned",
            Self::ContractUrl => "contractUrl",
            Self::TrackingUrl => "trackingUrl",
        }
    }

    pub fn group(&self) -> FieldGroup {
        match self {
            Self::AgreedPrice => FieldGroup::Price,
            Self::ContactEmail | Self::ContactInstagram | Self::ContactWhatsapp => {
                FieldGroup::Contact
            }
            Self::ShippingAddress
            | Self::ProductSuggestion1
            | Self::ProductSuggestion2
            | Self::ProductSuggestion3 => FieldGroup::Shipping,
            _ => FieldGroup::Other,
        }
    }

    /// Step whose detail record holds this field.
    pub fn step(&self) -> WorkflowStep {
        match self.group() {
            FieldGroup::Price | FieldGroup::Contact => WorkflowStep::PartnershipTerms,
            FieldGroup::Shipping => WorkflowStep::Shipping,
            FieldGroup::Other => match self {
                Self::ContractSigned | Self::ContractUrl => WorkflowStep::Contract,
                Self::TrackingUrl => WorkflowStep::Shipped,
                _ => WorkflowStep::Preparing,
            },
        }
    }

    /// Fields the influencer may write through the portal.
    pub fn is_influencer_writable(&self) -> bool {
        matches!(self.group(), FieldGroup::Contact | FieldGroup::Shipping)
    }

    /// Whether the workflow currently holds a value for this field.
    pub fn is_populated(&self, wf: &PartnershipWorkflow) -> bool {
        match self {
            Self::AgreedPrice => wf.terms.agreed_price.is_some(),
            Self::ContactEmail => wf.terms.contact_email.is_some(),
            Self::ContactInstagram => wf.terms.contact_instagram.is_some(),
            Self::ContactWhatsapp => wf.terms.contact_whatsapp.is_some(),
            Self::ShippingAddress => wf.shipping.shipping_address.is_some(),
            Self::ProductSuggestion1 => wf.shipping.product_suggestion_1.is_some(),
            Self::ProductSuggestion2 => wf.shipping.product_suggestion_2.is_some(),
            Self::ProductSuggestion3 => wf.shipping.product_suggestion_3.is_some(),
            Self::SelectedProductUrl => wf.preparation.selected_product_url.is_some(),
            Self::CouponCode => wf.preparation.coupon_code.is_some(),
            Self::ContractSigned => wf.contract.contract_signed,
            Self::ContractUrl => wf.contract.contract_url.is_some(),
            Self::TrackingUrl => wf.shipment.tracking_url.is_some(),
        }
    }
}

impl WorkflowField {
    /// Whether the two workflows hold different values for this field.
    pub fn differs(&self, a: &PartnershipWorkflow, b: &PartnershipWorkflow) -> bool {
        match self {
            Self::AgreedPrice => a.terms.agreed_price != b.terms.agreed_price,
            Self::ContactEmail => a.terms.contact_email != b.terms.contact_email,
            Self::ContactInstagram => a.terms.contact_instagram != b.terms.contact_instagram,
            Self::ContactWhatsapp => a.terms.contact_whatsapp != b.terms.contact_whatsapp,
            Self::ShippingAddress => a.shipping.shipping_address != b.shipping.shipping_address,
            Self::ProductSuggestion1 => a.shipping.product_suggestion_1 != b.shipping.product_suggestion_1,
            Self::ProductSuggestion2 => a.shipping.product_suggestion_2 != b.shipping.product_suggestion_2,
            Self::ProductSuggestion3 => a.shipping.product_suggestion_3 != b.shipping.product_suggestion_3,
            Self::SelectedProductUrl => {
                a.preparation.selected_product_url != b.preparation.selected_product_url
            }
            Self::CouponCode => a.preparation.coupon_code != b.preparation.coupon_code,
            Self::ContractSigned => a.contract.contract_signed != b.contract.contract_signed,
            Self::ContractUrl => a.contract.contract_url != b.contract.contract_url,
            Self::TrackingUrl => a.shipment.tracking_url != b.shipment.tracking_url,
        }
    }
}

impl fmt::Display for WorkflowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update: `None` leaves a field untouched, an empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkflowFieldsUpdate {
    pub agreed_price: Option<Decimal>,
    pub contact_email: Option<String>,
    pub contact_instagram: Option<String>,
    pub contact_whatsapp: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    pub product_suggestion_1: Option<String>,
    pub product_suggestion_2: Option<String>,
    pub product_suggestion_3: Option<String>,
    pub selected_product_url: Option<String>,
    pub coupon_code: Option<String>,
    pub contract_signed: Option<bool>,
    pub contract_url: Option<String>,
    pub tracking_url: Option<String>,
}

impl WorkflowFieldsUpdate {
    /// Fields present in this update, in declaration order.
    pub fn fields(&self) -> Vec<WorkflowField> {
        let present = [
            (WorkflowField::AgreedPrice, self.agreed_price.is_some()),
            (WorkflowField::ContactEmail, self.contact_email.is_some()),
            (WorkflowField::ContactInstagram, self.contact_instagram.is_some()),
            (WorkflowField::ContactWhatsapp, self.contact_whatsapp.is_some()),
            (WorkflowField::ShippingAddress, self.shipping_address.is_some()),
            (WorkflowField::ProductSuggestion1, self.product_suggestion_1.is_some()),
            (WorkflowField::ProductSuggestion2, self.product_suggestion_2.is_some()),
            (WorkflowField::ProductSuggestion3, self.product_suggestion_3.is_some()),
            (WorkflowField::SelectedProductUrl, self.selected_product_url.is_some()),
            (WorkflowField::CouponCode, self.coupon_code.is_some()),
            (WorkflowField::ContractSigned, self.contract_signed.is_some()),
            (WorkflowField::ContractUrl, self.contract_url.is_some()),
            (WorkflowField::TrackingUrl, self.tracking_url.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(field, is_set)| is_set.then_some(field))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Check value formats before anything is written.
    ///
    /// Reports the first invalid field.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(price) = self.agreed_price {
            if price < Decimal::ZERO {
                return Err(DomainError::invalid_value(
                    WorkflowField::AgreedPrice.as_str(),
                    "must not be negative",
                ));
            }
        }
        if let Some(email) = self.contact_email.as_deref().map(str::trim) {
            if !email.is_empty() && !is_plausible_email(email) {
                return Err(DomainError::invalid_value(
                    WorkflowField::ContactEmail.as_str(),
                    format!("'{email}' is not an email address"),
                ));
            }
        }
        let urls = [
            (WorkflowField::SelectedProductUrl, &self.selected_product_url),
            (WorkflowField::ContractUrl, &self.contract_url),
            (WorkflowField::TrackingUrl, &self.tracking_url),
        ];
        for (field, value) in urls {
            if let Some(url) = value.as_deref().map(str::trim) {
                if !url.is_empty() && !is_http_url(url) {
                    return Err(DomainError::invalid_value(
                        field.as_str(),
                        format!("'{url}' must start with http:// or https://"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Merge the provided fields into `wf`. Locks are checked by the caller.
    pub fn apply_to(&self, wf: &mut PartnershipWorkflow) {
        if let Some(price) = self.agreed_price {
            wf.terms.agreed_price = Some(price);
        }
        merge_text(&mut wf.terms.contact_email, &self.contact_email);
        merge_text(&mut wf.terms.contact_instagram, &self.contact_instagram);
        merge_text(&mut wf.terms.contact_whatsapp, &self.contact_whatsapp);
        if let Some(address) = &self.shipping_address {
            wf.shipping.shipping_address = PartnershipWorkflow::normalize_address(address);
        }
        merge_text(&mut wf.shipping.product_suggestion_1, &self.product_suggestion_1);
        merge_text(&mut wf.shipping.product_suggestion_2, &self.product_suggestion_2);
        merge_text(&mut wf.shipping.product_suggestion_3, &self.product_suggestion_3);
        merge_text(&mut wf.preparation.selected_product_url, &self.selected_product_url);
        merge_text(&mut wf.preparation.coupon_code, &self.coupon_code);
        if let Some(signed) = self.contract_signed {
            wf.contract.contract_signed = signed;
        }
        merge_text(&mut wf.contract.contract_url, &self.contract_url);
        merge_text(&mut wf.shipment.tracking_url, &self.tracking_url);
    }
}

fn merge_text(target: &mut Option<String>, value: &Option<String>) {
    if value.is_some() {
        *target = non_blank(value.clone());
    }
}

fn is_plausible_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !value.contains(' '),
        None => false,
    }
}

pub(crate) fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_fields_lists_only_provided() {
        let update = WorkflowFieldsUpdate {
            contact_email: Some("a@b.com".to_string()),
            contract_signed: Some(true),
            ..Default::default()
        };
        assert_eq!(
            update.fields(),
            vec![WorkflowField::ContactEmail, WorkflowField::ContractSigned]
        );
        assert!(WorkflowFieldsUpdate::default().is_empty());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let update = WorkflowFieldsUpdate {
            agreed_price: Some(Decimal::from(-1)),
            ..Default::default()
        };
        assert!(matches!(
            update.validate(),
            Err(DomainError::InvalidValue { ref field, .. }) if field == "agreedPrice"
        ));
    }

    #[test]
    fn test_validate_email_and_urls() {
        let bad_email = WorkflowFieldsUpdate {
            contact_email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(bad_email.validate().is_err());

        let cleared_email = WorkflowFieldsUpdate {
            contact_email: Some(String::new()),
            ..Default::default()
        };
        assert!(cleared_email.validate().is_ok());

        let bad_url = WorkflowFieldsUpdate {
            tracking_url: Some("ctt.pt/track/123".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_url.validate(),
            Err(DomainError::InvalidValue { ref field, .. }) if field == "trackingUrl"
        ));
    }

    #[test]
    fn test_apply_clears_on_empty_string() {
        let mut wf = PartnershipWorkflow::new(Uuid::new_v4());
        WorkflowFieldsUpdate {
            contact_instagram: Some("@ana".to_string()),
            product_suggestion_1: Some("  Serum  ".to_string()),
            ..Default::default()
        }
        .apply_to(&mut wf);
        assert_eq!(wf.terms.contact_instagram.as_deref(), Some("@ana"));
        assert_eq!(wf.shipping.product_suggestion_1.as_deref(), Some("Serum"));

        WorkflowFieldsUpdate {
            contact_instagram: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&mut wf);
        assert_eq!(wf.terms.contact_instagram, None);
        assert_eq!(wf.shipping.product_suggestion_1.as_deref(), Some("Serum"));
    }

    #[test]
    fn test_field_groups_and_steps() {
        assert_eq!(WorkflowField::AgreedPrice.group(), FieldGroup::Price);
        assert_eq!(WorkflowField::ProductSuggestion3.group(), FieldGroup::Shipping);
        assert_eq!(WorkflowField::CouponCode.step(), WorkflowStep::Preparing);
        assert_eq!(WorkflowField::ContractUrl.step(), WorkflowStep::Contract);
        assert_eq!(WorkflowField::TrackingUrl.step(), WorkflowStep::Shipped);
        assert!(WorkflowField::ContactWhatsapp.is_influencer_writable());
        assert!(!WorkflowField::AgreedPrice.is_influencer_writable());
        assert!(!WorkflowField::TrackingUrl.is_influencer_writable());
    }

    #[test]
    fn test_differs_compares_values() {
        let a = PartnershipWorkflow::new(Uuid::new_v4());
        let mut b = a.clone();
        b.terms.agreed_price = Some(Decimal::new(15000, 2));
        let mut c = a.clone();
        c.terms.agreed_price = Some(Decimal::from(150));
        assert!(WorkflowField::AgreedPrice.differs(&a, &b));
        assert!(!WorkflowField::AgreedPrice.differs(&b, &c));
        assert!(!WorkflowField::ContactEmail.differs(&a, &b));
    }

    #[test]
    fn test_update_deserializes_camel_case() {
        let json = r#"{"contactEmail":"a@b.com","agreedPrice":"150","productSuggestion1":"Serum"}"#;
        let update: WorkflowFieldsUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.agreed_price, Some(Decimal::from(150)));
        assert_eq!(update.product_suggestion_1.as_deref(), Some("Serum"));
    }
}
