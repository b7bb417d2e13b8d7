//! SQLite implementation of the InfluencerRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::influencer::{Influencer, InfluencerStatus};
use crate::domain::ports::influencer_repository::InfluencerRepository;

#[derive(Clone)]
pub struct SqliteInfluencerRepository {
    pool: SqlitePool,
}

impl SqliteInfluencerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name, email, instagram_handle, tiktok_handle, whatsapp_phone, status, portal_token, created_at, updated_at FROM influencers";

#[async_trait]
impl InfluencerRepository for SqliteInfluencerRepository {
    async fn get(&self, id: Uuid) -> DomainResult<Option<Influencer>> {
        let row: Option<InfluencerRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(InfluencerRow::try_into_influencer).transpose()
    }

    async fn get_by_portal_token(&self, token: &str) -> DomainResult<Option<Influencer>> {
        let row: Option<InfluencerRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE portal_token = ?"))
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        row.map(InfluencerRow::try_into_influencer).transpose()
    }

    async fn list(&self) -> DomainResult<Vec<Influencer>> {
        let rows: Vec<InfluencerRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY name COLLATE NOCASE, created_at"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(InfluencerRow::try_into_influencer).collect()
    }

    async fn save(&self, influencer: &Influencer) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO influencers (id, name, email, instagram_handle, tiktok_handle, whatsapp_phone, status, portal_token, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                instagram_handle = excluded.instagram_handle,
                tiktok_handle = excluded.tiktok_handle,
                whatsapp_phone = excluded.whatsapp_phone,
                status = excluded.status,
                portal_token = excluded.portal_token,
                updated_at = excluded.updated_at",
        )
        .bind(influencer.id.to_string())
        .bind(&influencer.name)
        .bind(&influencer.email)
        .bind(&influencer.instagram_handle)
        .bind(&influencer.tiktok_handle)
        .bind(&influencer.whatsapp_phone)
        .bind(influencer.status.as_str())
        .bind(&influencer.portal_token)
        .bind(influencer.created_at.to_rfc3339())
        .bind(influencer.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct InfluencerRow {
    id: String,
    name: String,
    email: Option<String>,
    instagram_handle: Option<String>,
    tiktok_handle: Option<String>,
    whatsapp_phone: Option<String>,
    status: String,
    portal_token: Option<String>,
    created_at: String,
    updated_at: String,
}

impl InfluencerRow {
    fn try_into_influencer(self) -> DomainResult<Influencer> {
        use crate::adapters::sqlite::{parse_datetime, parse_uuid};

        let status = InfluencerStatus::from_str(&self.status).ok_or_else(|| {
            DomainError::SerializationError(format!("Unknown influencer status: {}", self.status))
        })?;

        Ok(Influencer {
            id: parse_uuid(&self.id)?,
            name: self.name,
            email: self.email,
            instagram_handle: self.instagram_handle,
            tiktok_handle: self.tiktok_handle,
            whatsapp_phone: self.whatsapp_phone,
            status,
            portal_token: self.portal_token,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}
