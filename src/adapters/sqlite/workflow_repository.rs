//! SQLite implementation of the WorkflowRepository.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::workflow::{
    ContractDetails, EmailRecord, PartnershipWorkflow, PreparationDetails, ShipmentDetails,
    ShippingAddress, ShippingDetails, TermsDetails, WorkflowStatus, WorkflowStep,
};
use crate::domain::ports::workflow_repository::WorkflowRepository;

#[derive(Clone)]
pub struct SqliteWorkflowRepository {
    pool: SqlitePool,
}

impl SqliteWorkflowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_emails(&self, workflow_id: &str) -> DomainResult<Vec<EmailRecord>> {
        let rows: Vec<EmailRow> = sqlx::query_as(
            "SELECT step, template_key, subject, body, sent_by, sent_at
             FROM workflow_emails WHERE workflow_id = ? ORDER BY position",
        )
        .bind(workflow_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EmailRow::try_into_record).collect()
    }

    async fn hydrate(&self, row: WorkflowRow) -> DomainResult<PartnershipWorkflow> {
        let emails = self.load_emails(&row.id).await?;
        let mut workflow = row.try_into_workflow()?;
        workflow.emails = emails;
        Ok(workflow)
    }
}

const SELECT_COLUMNS: &str = "SELECT id, influencer_id, current_step, status, agreed_price, contact_email, contact_instagram, contact_whatsapp,
        shipping_address, product_suggestion_1, product_suggestion_2, product_suggestion_3,
        selected_product_url, coupon_code, contract_signed, contract_url, tracking_url,
        superseded_by, created_at, updated_at, completed_at
     FROM partnership_workflows";

#[async_trait]
impl WorkflowRepository for SqliteWorkflowRepository {
    async fn get(&self, id: Uuid) -> DomainResult<Option<PartnershipWorkflow>> {
        let row: Option<WorkflowRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn get_active_by_influencer(
        &self,
        influencer_id: Uuid,
    ) -> DomainResult<Option<PartnershipWorkflow>> {
        let row: Option<WorkflowRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE influencer_id = ? AND status = 'active'"
        ))
        .bind(influencer_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_by_influencer(&self, influencer_id: Uuid) -> DomainResult<Vec<PartnershipWorkflow>> {
        let rows: Vec<WorkflowRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE influencer_id = ? ORDER BY created_at DESC"
        ))
        .bind(influencer_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut workflows = Vec::with_capacity(rows.len());
        for row in rows {
            workflows.push(self.hydrate(row).await?);
        }
        Ok(workflows)
    }

    async fn save(&self, workflow: &PartnershipWorkflow) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;
        if let Err(e) = write_workflow(&mut tx, workflow).await {
            tx.rollback().await?;
            return Err(self.resolve_conflict(e).await);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn supersede(&self, old: &PartnershipWorkflow, fresh: &PartnershipWorkflow) -> DomainResult<()> {
        // The old record must leave `active` before the fresh one is inserted.
        let mut tx = self.pool.begin().await?;
        let mut written = write_workflow(&mut tx, old).await;
        if written.is_ok() {
            written = write_workflow(&mut tx, fresh).await;
        }
        if let Err(e) = written {
            tx.rollback().await?;
            return Err(self.resolve_conflict(e).await);
        }
        tx.commit().await?;
        Ok(())
    }
}

impl SqliteWorkflowRepository {
    /// Point an `AlreadyActive` error at the workflow that actually holds the slot.
    async fn resolve_conflict(&self, err: DomainError) -> DomainError {
        match err {
            DomainError::AlreadyActive {
                influencer_id,
                workflow_id,
            } => {
                let existing = self
                    .get_active_by_influencer(influencer_id)
                    .await
                    .ok()
                    .flatten();
                DomainError::AlreadyActive {
                    influencer_id,
                    workflow_id: existing.map_or(workflow_id, |w| w.id),
                }
            }
            other => other,
        }
    }
}

/// Upsert one workflow row and append its new email log entries.
///
/// A unique-index violation means a second active record for the influencer.
async fn write_workflow(conn: &mut SqliteConnection, workflow: &PartnershipWorkflow) -> DomainResult<()> {
    let shipping_address = workflow
        .shipping
        .shipping_address
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let result = sqlx::query(
        "INSERT INTO partnership_workflows (id, influencer_id, current_step, status, agreed_price, contact_email, contact_instagram, contact_whatsapp,
            shipping_address, product_suggestion_1, product_suggestion_2, product_suggestion_3,
            selected_product_url, coupon_code, contract_signed, contract_url, tracking_url,
            superseded_by, created_at, updated_at, completed_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            current_step = excluded.current_step,
            status = excluded.status,
            agreed_price = excluded.agreed_price,
            contact_email = excluded.contact_email,
            contact_instagram = excluded.contact_instagram,
            contact_whatsapp = excluded.contact_whatsapp,
            shipping_address = excluded.shipping_address,
            product_suggestion_1 = excluded.product_suggestion_1,
            product_suggestion_2 = excluded.product_suggestion_2,
            product_suggestion_3 = excluded.product_suggestion_3,
            selected_product_url = excluded.selected_product_url,
            coupon_code = excluded.coupon_code,
            contract_signed = excluded.contract_signed,
            contract_url = excluded.contract_url,
            tracking_url = excluded.tracking_url,
            superseded_by = excluded.superseded_by,
            updated_at = excluded.updated_at,
            completed_at = excluded.completed_at",
    )
    .bind(workflow.id.to_string())
    .bind(workflow.influencer_id.to_string())
    .bind(i64::from(workflow.current_step.number()))
    .bind(workflow.status.as_str())
    .bind(workflow.terms.agreed_price.map(|p| p.to_string()))
    .bind(&workflow.terms.contact_email)
    .bind(&workflow.terms.contact_instagram)
    .bind(&workflow.terms.contact_whatsapp)
    .bind(shipping_address)
    .bind(&workflow.shipping.product_suggestion_1)
    .bind(&workflow.shipping.product_suggestion_2)
    .bind(&workflow.shipping.product_suggestion_3)
    .bind(&workflow.preparation.selected_product_url)
    .bind(&workflow.preparation.coupon_code)
    .bind(workflow.contract.contract_signed)
    .bind(&workflow.contract.contract_url)
    .bind(&workflow.shipment.tracking_url)
    .bind(workflow.superseded_by.map(|id| id.to_string()))
    .bind(workflow.created_at.to_rfc3339())
    .bind(workflow.updated_at.to_rfc3339())
    .bind(workflow.completed_at.map(|t| t.to_rfc3339()))
    .execute(&mut *conn)
    .await;

    if let Err(sqlx::Error::Database(db_err)) = &result {
        if db_err.is_unique_violation() {
            return Err(DomainError::AlreadyActive {
                influencer_id: workflow.influencer_id,
                workflow_id: workflow.id,
            });
        }
    }
    result?;

    // The email log is append-only, so only rows past the stored count are new.
    let (stored,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM workflow_emails WHERE workflow_id = ?")
            .bind(workflow.id.to_string())
            .fetch_one(&mut *conn)
            .await?;
    let stored = usize::try_from(stored).unwrap_or(0);

    for (position, email) in workflow.emails.iter().enumerate().skip(stored) {
        sqlx::query(
            "INSERT INTO workflow_emails (workflow_id, position, step, template_key, subject, body, sent_by, sent_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(workflow.id.to_string())
        .bind(i64::try_from(position).unwrap_or(i64::MAX))
        .bind(i64::from(email.step.number()))
        .bind(&email.template_key)
        .bind(&email.subject)
        .bind(&email.body)
        .bind(&email.sent_by)
        .bind(email.sent_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// ============================================================================
// Row types for sqlx
// ============================================================================

#[derive(sqlx::FromRow)]
struct WorkflowRow {
    id: String,
    influencer_id: String,
    current_step: i64,
    status: String,
    agreed_price: Option<String>,
    contact_email: Option<String>,
    contact_instagram: Option<String>,
    contact_whatsapp: Option<String>,
    shipping_address: Option<String>,
    product_suggestion_1: Option<String>,
    product_suggestion_2: Option<String>,
    product_suggestion_3: Option<String>,
    selected_product_url: Option<String>,
    coupon_code: Option<String>,
    contract_signed: bool,
    contract_url: Option<String>,
    tracking_url: Option<String>,
    superseded_by: Option<String>,
    created_at: String,
    updated_at: String,
    completed_at: Option<String>,
}

fn parse_step(value: i64) -> DomainResult<WorkflowStep> {
    u8::try_from(value)
        .ok()
        .and_then(WorkflowStep::from_number)
        .ok_or_else(|| DomainError::SerializationError(format!("Unknown workflow step: {value}")))
}

impl WorkflowRow {
    fn try_into_workflow(self) -> DomainResult<PartnershipWorkflow> {
        use crate::adapters::sqlite::{
            parse_datetime, parse_optional_datetime, parse_optional_decimal, parse_optional_json,
            parse_optional_uuid, parse_uuid,
        };

        let status = WorkflowStatus::from_str(&self.status).ok_or_else(|| {
            DomainError::SerializationError(format!("Unknown workflow status: {}", self.status))
        })?;
        let shipping_address: Option<ShippingAddress> = parse_optional_json(self.shipping_address)?;

        Ok(PartnershipWorkflow {
            id: parse_uuid(&self.id)?,
            influencer_id: parse_uuid(&self.influencer_id)?,
            current_step: parse_step(self.current_step)?,
            status,
            terms: TermsDetails {
                agreed_price: parse_optional_decimal(self.agreed_price)?,
                contact_email: self.contact_email,
                contact_instagram: self.contact_instagram,
                contact_whatsapp: self.contact_whatsapp,
            },
            shipping: ShippingDetails {
                shipping_address,
                product_suggestion_1: self.product_suggestion_1,
                product_suggestion_2: self.product_suggestion_2,
                product_suggestion_3: self.product_suggestion_3,
            },
            preparation: PreparationDetails {
                selected_product_url: self.selected_product_url,
                coupon_code: self.coupon_code,
            },
            contract: ContractDetails {
                contract_signed: self.contract_signed,
                contract_url: self.contract_url,
            },
            shipment: ShipmentDetails {
                tracking_url: self.tracking_url,
            },
            emails: Vec::new(), // populated separately
            superseded_by: parse_optional_uuid(self.superseded_by)?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            completed_at: parse_optional_datetime(self.completed_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EmailRow {
    step: i64,
    template_key: String,
    subject: String,
    body: String,
    sent_by: String,
    sent_at: String,
}

impl EmailRow {
    fn try_into_record(self) -> DomainResult<EmailRecord> {
        Ok(EmailRecord {
            step: parse_step(self.step)?,
            template_key: self.template_key,
            subject: self.subject,
            body: self.body,
            sent_by: self.sent_by,
            sent_at: crate::adapters::sqlite::parse_datetime(&self.sent_at)?,
        })
    }
}
