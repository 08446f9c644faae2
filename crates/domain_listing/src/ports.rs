//! Listing Domain Ports
//!
//! The workflow needs single-record inserts and updates of listings plus an
//! append-only event trail. No multi-record transaction is assumed.

use async_trait::async_trait;

use core_kernel::{BrokerId, DomainPort, HealthCheckable, ListingId, OperationMetadata, PortError};

use crate::events::ListingEvent;
use crate::listing::{Listing, ListingStatus};

/// Query parameters for finding listings
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    /// Filter by owning broker
    pub broker_id: Option<BrokerId>,
    /// Filter by status
    pub status: Option<ListingStatus>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl ListingQuery {
    pub fn by_broker(broker_id: BrokerId) -> Self {
        Self {
            broker_id: Some(broker_id),
            ..Default::default()
        }
    }

    pub fn by_status(status: ListingStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

#[async_trait]
pub trait ListingPort: DomainPort + HealthCheckable {
    async fn insert_listing(
        &self,
        listing: &Listing,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    async fn update_listing(
        &self,
        listing: &Listing,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    async fn get_listing(
        &self,
        id: ListingId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Listing, PortError>;

    /// Matching listings, most recently updated first
    async fn find_listings(
        &self,
        query: ListingQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Listing>, PortError>;

    async fn record_event(
        &self,
        event: &ListingEvent,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// Mock implementation of ListingPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    /// In-memory mock implementation of ListingPort
    #[derive(Debug, Default)]
    pub struct MockListingPort {
        listings: Arc<RwLock<HashMap<ListingId, Listing>>>,
        events: Arc<RwLock<Vec<ListingEvent>>>,
        fail_writes: AtomicBool,
    }

    impl MockListingPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent insert or update fail
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        pub async fn count(&self) -> usize {
            self.listings.read().await.len()
        }

        /// Recorded events, oldest first
        pub async fn events(&self) -> Vec<ListingEvent> {
            self.events.read().await.clone()
        }

        fn check_writable(&self) -> Result<(), PortError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(PortError::connection("mock listing store unavailable"));
            }
            Ok(())
        }
    }

    impl DomainPort for MockListingPort {}

    #[async_trait]
    impl HealthCheckable for MockListingPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-listing-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ListingPort for MockListingPort {
        async fn insert_listing(
            &self,
            listing: &Listing,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.check_writable()?;
            let mut listings = self.listings.write().await;
            if listings.contains_key(&listing.id) {
                return Err(PortError::conflict(format!("listing {} already exists", listing.id)));
            }
            listings.insert(listing.id, listing.clone());
            Ok(())
        }

        async fn update_listing(
            &self,
            listing: &Listing,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.check_writable()?;
            let mut listings = self.listings.write().await;
            let stored = listings
                .get_mut(&listing.id)
                .ok_or_else(|| PortError::not_found("Listing", listing.id))?;
            *stored = listing.clone();
            Ok(())
        }

        async fn get_listing(
            &self,
            id: ListingId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Listing, PortError> {
            self.listings
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Listing", id))
        }

        async fn find_listings(
            &self,
            query: ListingQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Listing>, PortError> {
            let listings = self.listings.read().await;
            let mut results: Vec<_> = listings
                .values()
                .filter(|l| {
                    if let Some(broker_id) = query.broker_id {
                        if l.broker_id != broker_id {
                            return false;
                        }
                    }
                    if let Some(status) = query.status {
                        if l.status != status {
                            return false;
                        }
                    }
                    true
                })
                .cloned()
                .collect();

            results.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

            // Apply pagination
            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results = results.into_iter().take(limit as usize).collect();
            }

            Ok(results)
        }

        async fn record_event(
            &self,
            event: &ListingEvent,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.events.write().await.push(event.clone());
            Ok(())
        }
    }
}
