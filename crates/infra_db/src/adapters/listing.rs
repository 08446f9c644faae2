//! PostgreSQL adapter for the listing port
//!
//! Form state, the built payload and the review outcome are stored as JSONB
//! documents; the columns the workflow filters on are kept alongside them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    BrokerId, ConsentId, DomainPort, HealthCheckResult, HealthCheckable, ListingId,
    OperationMetadata, PortError,
};
use domain_listing::{
    Listing, ListingEvent, ListingForm, ListingPayload, ListingPort, ListingQuery, ListingStatus,
    ReviewOutcome,
};

use crate::error::DatabaseError;

const LISTING_COLUMNS: &str = "listing_id, broker_id, consent_id, status, property_type, title, \
     form, payload, review, submitted_at, revision, created_at, updated_at";

/// A row of `listings`
#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub listing_id: Uuid,
    pub broker_id: Uuid,
    pub consent_id: Option<Uuid>,
    pub status: String,
    pub property_type: Option<String>,
    pub title: String,
    pub form: Json<ListingForm>,
    pub payload: Option<Json<ListingPayload>>,
    pub review: Option<Json<ReviewOutcome>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Listing> for ListingRow {
    fn from(listing: &Listing) -> Self {
        Self {
            listing_id: listing.id.into(),
            broker_id: listing.broker_id.into(),
            consent_id: listing.consent_id.map(Into::into),
            status: listing.status.label().to_string(),
            property_type: listing.property_type().map(|t| t.label().to_string()),
            title: listing.title().to_string(),
            form: Json(listing.form.clone()),
            payload: listing.payload.clone().map(Json),
            review: listing.review.clone().map(Json),
            submitted_at: listing.submitted_at,
            revision: i32::try_from(listing.revision).unwrap_or(i32::MAX),
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

impl TryFrom<ListingRow> for Listing {
    type Error = DatabaseError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let status: ListingStatus = row
            .status
            .parse()
            .map_err(|_| DatabaseError::SerializationError(format!("unknown listing status '{}'", row.status)))?;
        let revision = u32::try_from(row.revision)
            .map_err(|_| DatabaseError::SerializationError(format!("negative revision {}", row.revision)))?;

        Ok(Listing {
            id: ListingId::from(row.listing_id),
            broker_id: BrokerId::from(row.broker_id),
            consent_id: row.consent_id.map(ConsentId::from),
            status,
            form: row.form.0,
            payload: row.payload.map(|p| p.0),
            submitted_at: row.submitted_at,
            review: row.review.map(|r| r.0),
            revision,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed implementation of [`ListingPort`]
#[derive(Debug, Clone)]
pub struct PostgresListingAdapter {
    pool: PgPool,
}

impl PostgresListingAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresListingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresListingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-listing-adapter").await
    }
}

#[async_trait]
impl ListingPort for PostgresListingAdapter {
    #[instrument(skip(self, listing, _metadata), fields(listing_id = %listing.id))]
    async fn insert_listing(
        &self,
        listing: &Listing,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!("Inserting listing");
        let row = ListingRow::from(listing);

        sqlx::query(
            r#"
            INSERT INTO listings (
                listing_id, broker_id, consent_id, status, property_type, title,
                form, payload, review, submitted_at, revision, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(row.listing_id)
        .bind(row.broker_id)
        .bind(row.consent_id)
        .bind(&row.status)
        .bind(&row.property_type)
        .bind(&row.title)
        .bind(&row.form)
        .bind(&row.payload)
        .bind(&row.review)
        .bind(row.submitted_at)
        .bind(row.revision)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    #[instrument(skip(self, listing, _metadata), fields(listing_id = %listing.id, status = %listing.status))]
    async fn update_listing(
        &self,
        listing: &Listing,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!("Updating listing");
        let row = ListingRow::from(listing);

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET consent_id = $2,
                status = $3,
                property_type = $4,
                title = $5,
                form = $6,
                payload = $7,
                review = $8,
                submitted_at = $9,
                revision = $10,
                updated_at = $11
            WHERE listing_id = $1
            "#,
        )
        .bind(row.listing_id)
        .bind(row.consent_id)
        .bind(&row.status)
        .bind(&row.property_type)
        .bind(&row.title)
        .bind(&row.form)
        .bind(&row.payload)
        .bind(&row.review)
        .bind(row.submitted_at)
        .bind(row.revision)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Listing", listing.id).into());
        }
        Ok(())
    }

    #[instrument(skip(self, _metadata), fields(listing_id = %id))]
    async fn get_listing(
        &self,
        id: ListingId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Listing, PortError> {
        debug!("Fetching listing by ID");

        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE listing_id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::not_found("Listing", id))?;

        Ok(Listing::try_from(row)?)
    }

    #[instrument(skip(self, _metadata))]
    async fn find_listings(
        &self,
        query: ListingQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Listing>, PortError> {
        debug!(?query, "Finding listings");

        let mut builder = listing_query(&query);
        let rows = builder
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| Listing::try_from(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, event, _metadata), fields(event_type = event.event_type(), listing_id = %event.listing_id()))]
    async fn record_event(
        &self,
        event: &ListingEvent,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let data = serde_json::to_value(event).map_err(DatabaseError::from)?;

        sqlx::query(
            r#"
            INSERT INTO listing_events (event_id, listing_id, event_type, event_data, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::from(event.event_id()))
        .bind(Uuid::from(event.listing_id()))
        .bind(event.event_type())
        .bind(Json(data))
        .bind(event.timestamp())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }
}

/// Builds the filtered select, most recently updated first
fn listing_query(query: &ListingQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {LISTING_COLUMNS} FROM listings WHERE TRUE"));
    if let Some(broker_id) = query.broker_id {
        builder.push(" AND broker_id = ").push_bind(Uuid::from(broker_id));
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.label());
    }
    builder.push(" ORDER BY updated_at DESC, listing_id DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(i64::from(limit));
    }
    if let Some(offset) = query.offset {
        builder.push(" OFFSET ").push_bind(i64::from(offset));
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::ReviewerId;
    use domain_listing::{build, ReviewDecision};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn land_form() -> ListingForm {
        ListingForm {
            property_type: "land".into(),
            title: " River Bottom ".into(),
            description: "Flat and irrigated".into(),
            sale_price: "310000".into(),
            acreage: "42.5".into(),
            ..Default::default()
        }
    }

    fn submitted() -> Listing {
        let form = land_form();
        let mut listing = Listing::new_draft(BrokerId::new(), form.clone(), now()).unwrap();
        let payload = build(&form, &form.resolve_schema().unwrap());
        listing.submit(form, payload, ConsentId::new(), now()).unwrap();
        listing
    }

    #[test]
    fn test_row_carries_filter_columns() {
        let row = ListingRow::from(&submitted());
        assert_eq!(row.status, "pending_review");
        assert_eq!(row.property_type.as_deref(), Some("land"));
        assert_eq!(row.title, "River Bottom");
        assert_eq!(row.revision, 2);
        assert!(row.payload.is_some());
    }

    #[test]
    fn test_row_round_trip() {
        let mut listing = submitted();
        listing
            .apply_review(ReviewOutcome {
                decision: ReviewDecision::Reject,
                reviewer: ReviewerId::new(),
                note: Some("Needs photos".into()),
                decided_at: now(),
            })
            .unwrap();

        let restored = Listing::try_from(ListingRow::from(&listing)).unwrap();
        assert_eq!(restored, listing);
    }

    #[test]
    fn test_blank_draft_has_no_property_type() {
        let draft = Listing::new_draft(BrokerId::new(), ListingForm::default(), now()).unwrap();
        let row = ListingRow::from(&draft);
        assert_eq!(row.property_type, None);
        assert!(row.consent_id.is_none());
    }

    #[test]
    fn test_corrupt_status_is_a_mapping_error() {
        let mut row = ListingRow::from(&submitted());
        row.status = "published".into();
        let err = Listing::try_from(row).unwrap_err();
        assert!(matches!(PortError::from(err), PortError::Transformation { .. }));
    }

    #[test]
    fn test_query_orders_newest_first() {
        let query = ListingQuery::by_status(ListingStatus::PendingReview);
        let builder = listing_query(&query);
        assert!(builder.sql().contains("status = $1"));
        assert!(builder.sql().ends_with("ORDER BY updated_at DESC, listing_id DESC"));
    }
}
