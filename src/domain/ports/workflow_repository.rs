//! Workflow repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::workflow::PartnershipWorkflow;

/// Repository interface for partnership workflow persistence.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Get a workflow by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<PartnershipWorkflow>>;

    /// Get the single ACTIVE workflow of an influencer, if any.
    async fn get_active_by_influencer(
        &self,
        influencer_id: Uuid,
    ) -> DomainResult<Option<PartnershipWorkflow>>;

    /// All workflows of an influencer, newest first.
    async fn list_by_influencer(&self, influencer_id: Uuid) -> DomainResult<Vec<PartnershipWorkflow>>;

    /// Insert or replace a workflow, including its email log.
    async fn save(&self, workflow: &PartnershipWorkflow) -> DomainResult<()>;

    /// Save the retired `old` workflow and the `fresh` one that replaces it
    /// as a single unit: either both are written or neither is.
    async fn supersede(&self, old: &PartnershipWorkflow, fresh: &PartnershipWorkflow) -> DomainResult<()>;
}
