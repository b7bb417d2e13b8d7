//! Influencer domain model.
//!
//! The influencer record carries the profile used for step-1 validation and
//! email variables, and the influencer-facing pipeline status that drives
//! field locking.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Influencer-facing pipeline status.
///
/// Variants are declared in pipeline order; comparisons use [`rank`](Self::rank).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluencerStatus {
    /// Discovered, not yet contacted
    Suggestion,
    /// First message sent
    Contacted,
    /// Workflow open, terms under discussion
    Negotiating,
    /// Staff sent a price; awaiting the influencer's response
    CounterProposal,
    /// Influencer proposed a price; awaiting internal review
    Analyzing,
    /// Price accepted by both sides
    Agreed,
    /// Product and coupon being prepared
    ProductSelection,
    /// Contract sent for signature
    ContractPending,
    /// Parcel shipped
    Shipped,
    /// Partnership finished
    Completed,
}

impl Default for InfluencerStatus {
    fn default() -> Self {
        Self::Suggestion
    }
}

impl InfluencerStatus {
    pub const ALL: [Self; 10] = [
        Self::Suggestion,
        Self::Contacted,
        Self::Negotiating,
        Self::CounterProposal,
        Self::Analyzing,
        Self::Agreed,
        Self::ProductSelection,
        Self::ContractPending,
        Self::Shipped,
        Self::Completed,
    ];

    /// Position in the pipeline.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Suggestion => 0,
            Self::Contacted => 1,
            Self::Negotiating => 2,
            Self::CounterProposal => 3,
            Self::Analyzing => 4,
            Self::Agreed => 5,
            Self::ProductSelection => 6,
            Self::ContractPending => 7,
            Self::Shipped => 8,
            Self::Completed => 9,
        }
    }

    /// At or beyond `other` in the pipeline.
    pub fn has_reached(&self, other: Self) -> bool {
        self.rank() >= other.rank()
    }

    /// Strictly beyond `other` in the pipeline.
    pub fn is_past(&self, other: Self) -> bool {
        self.rank() > other.rank()
    }

    /// A price round is open, in either direction.
    pub fn is_counter_negotiation(&self) -> bool {
        matches!(self, Self::CounterProposal | Self::Analyzing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Suggestion => "suggestion",
            Self::Contacted => "contacted",
            Self::Negotiating => "negotiating",
            Self::CounterProposal => "counter_proposal",
            Self::Analyzing => "analyzing",
            Self::Agreed => "agreed",
            Self::ProductSelection => "product_selection",
            Self::ContractPending => "contract_pending",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "suggestion" => Some(Self::Suggestion),
            "contacted" => Some(Self::Contacted),
            "negotiating" => Some(Self::Negotiating),
            "counter_proposal" | "counterproposal" => Some(Self::CounterProposal),
            "analyzing" => Some(Self::Analyzing),
            "agreed" => Some(Self::Agreed),
            "product_selection" => Some(Self::ProductSelection),
            "contract_pending" => Some(Self::ContractPending),
            "shipped" => Some(Self::Shipped),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for InfluencerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A creator the brand partners with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Influencer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub status: InfluencerStatus,
    /// Secret that authorizes portal access; replaced on every issue.
    #[serde(skip_serializing)]
    pub portal_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Influencer {
    pub fn new(profile: NewInfluencer) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: profile.name.trim().to_string(),
            email: non_blank(profile.email),
            instagram_handle: non_blank(profile.instagram_handle),
            tiktok_handle: non_blank(profile.tiktok_handle),
            whatsapp_phone: non_blank(profile.whatsapp_phone),
            status: InfluencerStatus::Contacted,
            portal_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: InfluencerStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Profile data supplied when registering an influencer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInfluencer {
    pub name: String,
    pub email: Option<String>,
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub whatsapp_phone: Option<String>,
}

/// Trim a string and drop it when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
