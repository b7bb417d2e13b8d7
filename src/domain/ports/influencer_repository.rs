//! Influencer repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::influencer::Influencer;

/// Repository interface for influencer persistence.
#[async_trait]
pub trait InfluencerRepository: Send + Sync {
    /// Get an influencer by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Influencer>>;

    /// Resolve a portal token to its influencer.
    async fn get_by_portal_token(&self, token: &str) -> DomainResult<Option<Influencer>>;

    /// All influencers ordered by name.
    async fn list(&self) -> DomainResult<Vec<Influencer>>;

    /// Insert or replace an influencer.
    async fn save(&self, influencer: &Influencer) -> DomainResult<()>;
}
