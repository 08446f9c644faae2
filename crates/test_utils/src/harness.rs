//! In-memory wiring of the listing workflow
//!
//! Mirrors the server's composition with mock ports and a fixed clock, and
//! keeps handles on every mock so tests can inspect or break them.

use std::sync::Arc;

use core_kernel::{BrokerId, ConsentId, FixedClock, ReviewerId};
use domain_consent::{ClientConsent, ConsentRegistry, MockConsentPort, MockDocumentStore};
use domain_listing::{ListingService, MockListingPort};

use crate::builders::ConsentBuilder;
use crate::fixtures::TemporalFixtures;

pub struct WorkflowHarness {
    pub service: Arc<ListingService>,
    pub listings: Arc<MockListingPort>,
    pub consents: Arc<MockConsentPort>,
    pub documents: Arc<MockDocumentStore>,
    pub clock: Arc<FixedClock>,
}

impl Default for WorkflowHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowHarness {
    pub fn new() -> Self {
        let listings = Arc::new(MockListingPort::new());
        let consents = Arc::new(MockConsentPort::new());
        let documents = Arc::new(MockDocumentStore::new());
        let clock = Arc::new(FixedClock::at(TemporalFixtures::now()));
        let registry = ConsentRegistry::new(consents.clone(), documents.clone(), clock.clone());

        Self {
            service: Arc::new(ListingService::new(listings.clone(), Arc::new(registry))),
            listings,
            consents,
            documents,
            clock,
        }
    }

    /// Stores a consent as-is, bypassing the registry
    pub async fn store_consent(&self, consent: ClientConsent) -> ConsentId {
        let id = consent.id;
        self.consents.put(consent).await;
        id
    }

    /// A verified consent valid for the default window
    pub async fn verified_consent(&self, broker_id: BrokerId) -> ConsentId {
        self.store_consent(ConsentBuilder::new(broker_id).verified().build())
            .await
    }

    /// Runs the review authority's verification through the registry
    pub async fn verify(&self, consent_id: ConsentId) -> ClientConsent {
        self.service
            .consents()
            .verify(consent_id, ReviewerId::new())
            .await
            .expect("consent should verify")
    }
}
