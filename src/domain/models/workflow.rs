//! Partnership workflow domain model.
//!
//! A workflow walks one influencer relationship through five fixed steps:
//!
//! ```text
//! PartnershipTerms → Shipping → Preparing → Contract → Shipped → (Completed)
//! ```
//!
//! Each step owns a typed detail record. The step counter only moves forward;
//! starting over means superseding the record with a fresh one.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// One of the five ordered phases of a partnership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    /// Price negotiation and contact details
    PartnershipTerms,
    /// Shipping address and product suggestions
    Shipping,
    /// Product selection and coupon assignment
    Preparing,
    /// Contract signature
    Contract,
    /// Parcel shipped, tracking available
    Shipped,
}

impl Default for WorkflowStep {
    fn default() -> Self {
        Self::PartnershipTerms
    }
}

impl WorkflowStep {
    pub const ALL: [Self; 5] = [
        Self::PartnershipTerms,
        Self::Shipping,
        Self::Preparing,
        Self::Contract,
        Self::Shipped,
    ];

    /// 1-based step number.
    pub fn number(&self) -> u8 {
        match self {
            Self::PartnershipTerms => 1,
            Self::Shipping => 2,
            Self::Preparing => 3,
            Self::Contract => 4,
            Self::Shipped => 5,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::PartnershipTerms),
            2 => Some(Self::Shipping),
            3 => Some(Self::Preparing),
            4 => Some(Self::Contract),
            5 => Some(Self::Shipped),
            _ => None,
        }
    }

    /// The following step, or `None` when this is the last one.
    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn is_last(&self) -> bool {
        matches!(self, Self::Shipped)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PartnershipTerms => "Partnership terms",
            Self::Shipping => "Shipping",
            Self::Preparing => "Preparing",
            Self::Contract => "Contract",
            Self::Shipped => "Shipped",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}

/// Lifecycle status of a workflow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Active,
    Completed,
    Cancelled,
}

impl Default for WorkflowStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "completed" | "complete" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Completed and cancelled workflows are immutable.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postal address the product is shipped to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    pub fn new(
        street: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }

    /// Street, postal code and country are all non-blank.
    pub fn is_complete(&self) -> bool {
        [&self.street, &self.postal_code, &self.country]
            .iter()
            .all(|part| !part.trim().is_empty())
    }

    /// Every component is blank.
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.postal_code, &self.country]
            .iter()
            .all(|part| part.trim().is_empty())
    }

    fn trimmed(&self) -> Self {
        Self::new(self.street.trim(), self.postal_code.trim(), self.country.trim())
    }
}

impl fmt::Display for ShippingAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.street, &self.postal_code, &self.country]
            .into_iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Step 1: negotiated price and how to reach the influencer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermsDetails {
    pub agreed_price: Option<Decimal>,
    pub contact_email: Option<String>,
    pub contact_instagram: Option<String>,
    pub contact_whatsapp: Option<String>,
}

/// Step 2: where to ship and what the influencer would like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub shipping_address: Option<ShippingAddress>,
    pub product_suggestion_1: Option<String>,
    pub product_suggestion_2: Option<String>,
    pub product_suggestion_3: Option<String>,
}

impl ShippingDetails {
    /// The minimum step-2 subset has been filled in.
    pub fn is_submitted(&self) -> bool {
        self.shipping_address
            .as_ref()
            .is_some_and(ShippingAddress::is_complete)
            && self.product_suggestion_1.is_some()
    }
}

/// Step 3: the chosen product and its discount code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparationDetails {
    pub selected_product_url: Option<String>,
    pub coupon_code: Option<String>,
}

/// Step 4: contract signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractDetails {
    pub contract_signed: bool,
    pub contract_url: Option<String>,
}

/// Step 5: shipment tracking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDetails {
    pub tracking_url: Option<String>,
}

/// Append-only audit entry for an email sent on behalf of the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub step: WorkflowStep,
    pub template_key: String,
    pub subject: String,
    pub body: String,
    pub sent_by: String,
    pub sent_at: DateTime<Utc>,
}

/// Per-influencer partnership record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnershipWorkflow {
    pub id: Uuid,
    pub influencer_id: Uuid,
    pub current_step: WorkflowStep,
    pub status: WorkflowStatus,
    pub terms: TermsDetails,
    pub shipping: ShippingDetails,
    pub preparation: PreparationDetails,
    pub contract: ContractDetails,
    pub shipment: ShipmentDetails,
    pub emails: Vec<EmailRecord>,
    /// Set when `restart` replaced this record with a fresh one.
    pub superseded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PartnershipWorkflow {
    /// Fresh workflow at step 1 with every optional field empty.
    pub fn new(influencer_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            influencer_id,
            current_step: WorkflowStep::PartnershipTerms,
            status: WorkflowStatus::Active,
            terms: TermsDetails::default(),
            shipping: ShippingDetails::default(),
            preparation: PreparationDetails::default(),
            contract: ContractDetails::default(),
            shipment: ShipmentDetails::default(),
            emails: Vec::new(),
            superseded_by: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == WorkflowStatus::Active
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// A price was proposed and it is positive.
    pub fn has_agreed_price(&self) -> bool {
        self.terms.agreed_price.is_some_and(|p| p > Decimal::ZERO)
    }

    /// Reject any mutation once the workflow is completed or cancelled.
    pub fn ensure_mutable(&self) -> DomainResult<()> {
        if self.is_terminal() {
            return Err(DomainError::TerminalState {
                id: self.id,
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    /// Move to the next step, or complete the workflow when leaving the last one.
    ///
    /// Returns the step that was left.
    pub fn step_forward(&mut self) -> DomainResult<WorkflowStep> {
        self.ensure_mutable()?;
        let from = self.current_step;
        match from.next() {
            Some(next) => self.current_step = next,
            None => {
                self.status = WorkflowStatus::Completed;
                self.completed_at = Some(Utc::now());
            }
        }
        self.touch();
        Ok(from)
    }

    /// Mark the workflow cancelled.
    pub fn cancel(&mut self) -> DomainResult<()> {
        self.ensure_mutable()?;
        self.status = WorkflowStatus::Cancelled;
        self.touch();
        Ok(())
    }

    pub fn record_email(&mut self, record: EmailRecord) {
        self.emails.push(record);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub(crate) fn normalize_address(address: &ShippingAddress) -> Option<ShippingAddress> {
        if address.is_blank() {
            None
        } else {
            Some(address.trimmed())
        }
    }
}
