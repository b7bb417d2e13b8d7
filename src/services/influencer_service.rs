//! Influencer service: registration, lookup and portal tokens.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::influencer::{Influencer, NewInfluencer};
use crate::domain::ports::InfluencerRepository;

pub struct InfluencerService<R: InfluencerRepository> {
    repository: Arc<R>,
}

impl<R: InfluencerRepository> InfluencerService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Register a new influencer with status `contacted`.
    pub async fn register(&self, profile: NewInfluencer) -> DomainResult<Influencer> {
        if profile.name.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "Influencer name cannot be empty".to_string(),
            ));
        }
        if let Some(email) = profile.email.as_deref().map(str::trim) {
            if !email.is_empty() && !email.contains('@') {
                return Err(DomainError::invalid_value(
                    "email",
                    format!("'{email}' is not an email address"),
                ));
            }
        }

        let influencer = Influencer::new(profile);
        self.repository.save(&influencer).await?;

        info!(influencer_id = %influencer.id, name = %influencer.name, "Influencer registered");
        Ok(influencer)
    }

    /// Get an influencer by ID.
    pub async fn get(&self, id: Uuid) -> DomainResult<Influencer> {
        self.repository
            .get(id)
            .await?
            .ok_or(DomainError::InfluencerNotFound(id))
    }

    pub async fn list(&self) -> DomainResult<Vec<Influencer>> {
        self.repository.list().await
    }

    /// Issue a fresh portal token, invalidating the previous one.
    pub async fn issue_portal_token(&self, id: Uuid) -> DomainResult<String> {
        let mut influencer = self.get(id).await?;
        let token = Uuid::new_v4().simple().to_string();
        influencer.portal_token = Some(token.clone());
        influencer.updated_at = chrono::Utc::now();
        self.repository.save(&influencer).await?;

        info!(influencer_id = %id, "Portal token issued");
        Ok(token)
    }

    /// Resolve a portal token. Unknown or blank tokens fail with `PortalTokenInvalid`.
    pub async fn find_by_portal_token(&self, token: &str) -> DomainResult<Influencer> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::PortalTokenInvalid);
        }
        self.repository
            .get_by_portal_token(token)
            .await?
            .ok_or(DomainError::PortalTokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteInfluencerRepository};
    use crate::domain::models::influencer::InfluencerStatus;

    async fn setup_service() -> InfluencerService<SqliteInfluencerRepository> {
        let pool = create_migrated_test_pool().await.unwrap();
        InfluencerService::new(Arc::new(SqliteInfluencerRepository::new(pool)))
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let service = setup_service().await;
        let influencer = service
            .register(NewInfluencer {
                name: "  Ana Lima ".to_string(),
                email: Some("ana@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(influencer.name, "Ana Lima");
        assert_eq!(influencer.status, InfluencerStatus::Contacted);

        let loaded = service.get(influencer.id).await.unwrap();
        assert_eq!(loaded.id, influencer.id);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = setup_service().await;

        let result = service
            .register(NewInfluencer {
                name: "   ".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(DomainError::ValidationFailed(_))));

        let result = service
            .register(NewInfluencer {
                name: "Ana".to_string(),
                email: Some("ana.example.com".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(DomainError::InvalidValue { .. })));
    }

    #[tokio::test]
    async fn test_get_missing_influencer() {
        let service = setup_service().await;
        let id = Uuid::new_v4();
        assert!(matches!(
            service.get(id).await,
            Err(DomainError::InfluencerNotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_reissued_token_replaces_previous() {
        let service = setup_service().await;
        let influencer = service
            .register(NewInfluencer {
                name: "Ana".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let first = service.issue_portal_token(influencer.id).await.unwrap();
        assert_eq!(service.find_by_portal_token(&first).await.unwrap().id, influencer.id);

        let second = service.issue_portal_token(influencer.id).await.unwrap();
        assert_ne!(first, second);
        assert!(matches!(
            service.find_by_portal_token(&first).await,
            Err(DomainError::PortalTokenInvalid)
        ));
        assert_eq!(service.find_by_portal_token(&second).await.unwrap().id, influencer.id);
        assert!(matches!(
            service.find_by_portal_token("").await,
            Err(DomainError::PortalTokenInvalid)
        ));
    }
}
