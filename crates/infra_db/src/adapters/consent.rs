//! PostgreSQL adapter for the consent port

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    BrokerId, ConsentId, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata,
    PortError, ReviewerId,
};
use domain_consent::{ClientConsent, ClientContact, ConsentPort, ConsentQuery, ConsentStatus};

use crate::error::DatabaseError;

const CONSENT_COLUMNS: &str = "consent_id, broker_id, client_name, client_email, client_phone, \
     document_reference, status, created_at, expires_at, verified_by, verified_at";

/// A row of `client_consents`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ConsentRow {
    pub consent_id: Uuid,
    pub broker_id: Uuid,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub document_reference: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl From<&ClientConsent> for ConsentRow {
    fn from(consent: &ClientConsent) -> Self {
        Self {
            consent_id: consent.id.into(),
            broker_id: consent.broker_id.into(),
            client_name: consent.client_name.clone(),
            client_email: consent.client_contact.email.clone(),
            client_phone: consent.client_contact.phone.clone(),
            document_reference: consent.document_reference.clone(),
            // Only the stored status is persisted; expiry is derived on read
            status: consent.stored_status().label().to_string(),
            created_at: consent.created_at,
            expires_at: consent.expires_at,
            verified_by: consent.verified_by.map(Into::into),
            verified_at: consent.verified_at,
        }
    }
}

impl TryFrom<ConsentRow> for ClientConsent {
    type Error = DatabaseError;

    fn try_from(row: ConsentRow) -> Result<Self, Self::Error> {
        let status: ConsentStatus = row
            .status
            .parse()
            .map_err(|_| DatabaseError::SerializationError(format!("unknown consent status '{}'", row.status)))?;

        Ok(ClientConsent::restore(
            ConsentId::from(row.consent_id),
            BrokerId::from(row.broker_id),
            row.client_name,
            ClientContact::new(row.client_email, row.client_phone),
            row.document_reference,
            status,
            row.created_at,
            row.expires_at,
            row.verified_by.map(ReviewerId::from),
            row.verified_at,
        ))
    }
}

/// PostgreSQL-backed implementation of [`ConsentPort`]
#[derive(Debug, Clone)]
pub struct PostgresConsentAdapter {
    pool: PgPool,
}

impl PostgresConsentAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresConsentAdapter {}

#[async_trait]
impl HealthCheckable for PostgresConsentAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-consent-adapter").await
    }
}

#[async_trait]
impl ConsentPort for PostgresConsentAdapter {
    #[instrument(skip(self, consent, _metadata), fields(consent_id = %consent.id))]
    async fn insert_consent(
        &self,
        consent: &ClientConsent,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!("Inserting consent");
        let row = ConsentRow::from(consent);

        sqlx::query(
            r#"
            INSERT INTO client_consents (
                consent_id, broker_id, client_name, client_email, client_phone,
                document_reference, status, created_at, expires_at, verified_by, verified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(row.consent_id)
        .bind(row.broker_id)
        .bind(&row.client_name)
        .bind(&row.client_email)
        .bind(&row.client_phone)
        .bind(&row.document_reference)
        .bind(&row.status)
        .bind(row.created_at)
        .bind(row.expires_at)
        .bind(row.verified_by)
        .bind(row.verified_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    #[instrument(skip(self, consent, _metadata), fields(consent_id = %consent.id))]
    async fn update_consent(
        &self,
        consent: &ClientConsent,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!("Updating consent");
        let row = ConsentRow::from(consent);

        let result = sqlx::query(
            r#"
            UPDATE client_consents
            SET client_name = $2,
                client_email = $3,
                client_phone = $4,
                document_reference = $5,
                status = $6,
                expires_at = $7,
                verified_by = $8,
                verified_at = $9
            WHERE consent_id = $1
            "#,
        )
        .bind(row.consent_id)
        .bind(&row.client_name)
        .bind(&row.client_email)
        .bind(&row.client_phone)
        .bind(&row.document_reference)
        .bind(&row.status)
        .bind(row.expires_at)
        .bind(row.verified_by)
        .bind(row.verified_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Consent", consent.id).into());
        }
        Ok(())
    }

    #[instrument(skip(self, _metadata), fields(consent_id = %id))]
    async fn delete_consent(
        &self,
        id: ConsentId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!("Deleting consent");

        let result = sqlx::query("DELETE FROM client_consents WHERE consent_id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Consent", id).into());
        }
        Ok(())
    }

    #[instrument(skip(self, _metadata), fields(consent_id = %id))]
    async fn get_consent(
        &self,
        id: ConsentId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<ClientConsent, PortError> {
        debug!("Fetching consent by ID");

        let row = sqlx::query_as::<_, ConsentRow>(&format!(
            "SELECT {CONSENT_COLUMNS} FROM client_consents WHERE consent_id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::not_found("Consent", id))?;

        Ok(ClientConsent::try_from(row)?)
    }

    #[instrument(skip(self, _metadata))]
    async fn find_consents(
        &self,
        query: ConsentQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<ClientConsent>, PortError> {
        debug!(?query, "Finding consents");

        let mut builder = consent_query(&query);
        let rows = builder
            .build_query_as::<ConsentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| ClientConsent::try_from(row).map_err(PortError::from))
            .collect()
    }
}

/// Builds the filtered select, soonest expiry first
fn consent_query(query: &ConsentQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {CONSENT_COLUMNS} FROM client_consents WHERE TRUE"));
    if let Some(broker_id) = query.broker_id {
        builder.push(" AND broker_id = ").push_bind(Uuid::from(broker_id));
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.label());
    }
    builder.push(" ORDER BY expires_at ASC, consent_id ASC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(i64::from(limit));
    }
    if let Some(offset) = query.offset {
        builder.push(" OFFSET ").push_bind(i64::from(offset));
    }
    builder
}
