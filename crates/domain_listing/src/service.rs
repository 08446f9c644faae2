//! Listing workflow service
//!
//! Orchestrates drafts, submission and review. A submission is all or
//! nothing: every check runs before any document is uploaded or any record
//! is written, and the consent document is stored before the consent record
//! that references it. A consent registered for a submission whose listing
//! write then fails is withdrawn again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use core_kernel::{BrokerId, Clock, ConsentId, EventId, ListingId, OperationMetadata, ReviewerId};
use domain_consent::{ClientConsent, ConsentRegistry, NewClient};

use crate::draft::{build, ListingForm, ListingPayload};
use crate::error::{ListingError, ValidationError};
use crate::events::ListingEvent;
use crate::listing::{Listing, ListingStatus, ReviewDecision, ReviewOutcome};
use crate::ports::{ListingPort, ListingQuery};
use crate::property::{resolve, ListingMode, PropertySchema, PropertyType};
use crate::publication::{check_schema, check_title, check_tracts};

/// How the broker is backing the listing with a consent
#[derive(Debug, Clone)]
pub enum ConsentSelection {
    /// A consent picked from the usable list
    Existing(ConsentId),
    /// A client registered alongside this submission
    NewClient(NewClient),
}

/// Everything the broker sends when pressing submit
#[derive(Debug, Clone)]
pub struct Submission {
    pub form: ListingForm,
    pub consent: Option<ConsentSelection>,
}

/// The consent a submission ended up backed by
///
/// `registered` is set when the consent was created by this submission.
struct AttachedConsent {
    id: ConsentId,
    registered: Option<ClientConsent>,
}

/// A submission that passed every check but has not been written
struct PreparedSubmission {
    payload: ListingPayload,
    consent: PreparedConsent,
}

enum PreparedConsent {
    Existing(ConsentId),
    NewClient(NewClient),
}

pub struct ListingService {
    listings: Arc<dyn ListingPort>,
    consents: Arc<ConsentRegistry>,
    clock: Arc<dyn Clock>,
}

impl ListingService {
    pub fn new(listings: Arc<dyn ListingPort>, consents: Arc<ConsentRegistry>) -> Self {
        let clock = consents.clock().clone();
        Self {
            listings,
            consents,
            clock,
        }
    }

    pub fn consents(&self) -> &Arc<ConsentRegistry> {
        &self.consents
    }

    /// Creates a draft from whatever the broker has so far
    pub async fn create_draft(&self, broker_id: BrokerId, form: ListingForm) -> Result<Listing, ListingError> {
        let now = self.clock.now();
        let listing = Listing::new_draft(broker_id, form, now).map_err(|e| self.report(e))?;
        self.listings.insert_listing(&listing, Some(metadata_for(broker_id))).await?;
        self.record(ListingEvent::DraftSaved {
            event_id: EventId::new_v7(),
            listing_id: listing.id,
            broker_id,
            revision: listing.revision,
            timestamp: now,
        })
        .await;

        info!(listing_id = %listing.id, broker_id = %broker_id, "Listing draft created");
        Ok(listing)
    }

    /// Saves form state on a draft or rejected listing
    pub async fn save_draft(
        &self,
        broker_id: BrokerId,
        listing_id: ListingId,
        form: ListingForm,
    ) -> Result<Listing, ListingError> {
        let now = self.clock.now();
        let mut listing = self.get(broker_id, listing_id).await?;
        let previous = listing.status;
        listing.save_draft(form, now).map_err(|e| self.report(e))?;
        self.listings.update_listing(&listing, Some(metadata_for(broker_id))).await?;
        self.record(ListingEvent::DraftSaved {
            event_id: EventId::new_v7(),
            listing_id,
            broker_id,
            revision: listing.revision,
            timestamp: now,
        })
        .await;

        info!(
            listing_id = %listing_id,
            from = %previous,
            revision = listing.revision,
            "Listing draft saved"
        );
        Ok(listing)
    }

    /// Creates and submits a listing in one step
    ///
    /// Nothing is persisted unless the whole submission succeeds up to the
    /// listing insert.
    pub async fn submit_new(&self, broker_id: BrokerId, submission: Submission) -> Result<Listing, ListingError> {
        let prepared = self
            .prepare(broker_id, &submission)
            .await
            .map_err(|e| self.report(e))?;

        let now = self.clock.now();
        let mut listing = Listing::new_draft(broker_id, submission.form.clone(), now)?;
        let attached = self
            .attach_consent(broker_id, prepared.consent)
            .await
            .map_err(|e| self.report(e))?;
        let consent_id = attached.id;

        let written = match listing.submit(submission.form, prepared.payload, consent_id, now) {
            Ok(()) => self
                .listings
                .insert_listing(&listing, Some(metadata_for(broker_id)))
                .await
                .map_err(ListingError::Storage),
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!(listing_id = %listing.id, consent_id = %consent_id, error = %e, "Listing insert failed after consent was attached");
            self.release(attached).await;
            return Err(self.report(e));
        }

        self.after_submit(&listing, consent_id, now).await;
        Ok(listing)
    }

    /// Submits an existing draft or a rejected listing
    pub async fn submit_existing(
        &self,
        broker_id: BrokerId,
        listing_id: ListingId,
        submission: Submission,
    ) -> Result<Listing, ListingError> {
        let mut listing = self.get(broker_id, listing_id).await?;
        if !listing.status.can_transition_to(ListingStatus::PendingReview) {
            return Err(self.report(ListingError::InvalidStatusTransition {
                from: listing.status.to_string(),
                to: ListingStatus::PendingReview.to_string(),
            }));
        }

        let prepared = self
            .prepare(broker_id, &submission)
            .await
            .map_err(|e| self.report(e))?;

        let now = self.clock.now();
        let attached = self
            .attach_consent(broker_id, prepared.consent)
            .await
            .map_err(|e| self.report(e))?;
        let consent_id = attached.id;

        let written = match listing.submit(submission.form, prepared.payload, consent_id, now) {
            Ok(()) => self
                .listings
                .update_listing(&listing, Some(metadata_for(broker_id)))
                .await
                .map_err(ListingError::Storage),
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!(listing_id = %listing.id, consent_id = %consent_id, error = %e, "Listing update failed after consent was attached");
            self.release(attached).await;
            return Err(self.report(e));
        }

        self.after_submit(&listing, consent_id, now).await;
        Ok(listing)
    }

    /// Loads a listing owned by the broker
    pub async fn get(&self, broker_id: BrokerId, listing_id: ListingId) -> Result<Listing, ListingError> {
        let listing = self.load(listing_id).await?;
        if !listing.is_owned_by(broker_id) {
            return Err(ListingError::NotOwner { listing_id, broker_id });
        }
        Ok(listing)
    }

    pub async fn list_for_broker(&self, broker_id: BrokerId) -> Result<Vec<Listing>, ListingError> {
        Ok(self
            .listings
            .find_listings(ListingQuery::by_broker(broker_id), Some(metadata_for(broker_id)))
            .await?)
    }

    /// Submissions waiting for the review authority
    pub async fn list_pending_review(&self) -> Result<Vec<Listing>, ListingError> {
        Ok(self
            .listings
            .find_listings(ListingQuery::by_status(ListingStatus::PendingReview), None)
            .await?)
    }

    /// Applies the review authority's decision to a pending listing
    pub async fn apply_review(
        &self,
        listing_id: ListingId,
        reviewer: ReviewerId,
        decision: ReviewDecision,
        note: Option<String>,
    ) -> Result<Listing, ListingError> {
        let now = self.clock.now();
        let mut listing = self.load(listing_id).await?;
        listing.apply_review(ReviewOutcome {
            decision,
            reviewer,
            note: note.clone(),
            decided_at: now,
        })?;
        self.listings.update_listing(&listing, None).await?;

        let event = match decision {
            ReviewDecision::Approve => ListingEvent::Approved {
                event_id: EventId::new_v7(),
                listing_id,
                reviewer,
                timestamp: now,
            },
            ReviewDecision::Reject => ListingEvent::Rejected {
                event_id: EventId::new_v7(),
                listing_id,
                reviewer,
                reason: note.unwrap_or_default(),
                timestamp: now,
            },
        };
        self.record(event).await;

        info!(listing_id = %listing_id, reviewer = %reviewer, status = %listing.status, "Listing reviewed");
        Ok(listing)
    }

    /// Runs every check in order without writing anything
    async fn prepare(&self, broker_id: BrokerId, submission: &Submission) -> Result<PreparedSubmission, ListingError> {
        let form = &submission.form;
        let property_type: PropertyType = form.property_type.parse()?;
        let listing_mode: ListingMode = form.listing_mode.parse()?;
        let schema: PropertySchema = resolve(property_type, listing_mode);
        let payload = build(form, &schema);

        check_title(&payload)?;

        // Re-checked here, not when the consent was picked in the form
        let consent = match &submission.consent {
            None => return Err(ValidationError::missing_consent().into()),
            Some(ConsentSelection::Existing(consent_id)) => {
                self.consents.require_usable(broker_id, *consent_id).await?;
                PreparedConsent::Existing(*consent_id)
            }
            Some(ConsentSelection::NewClient(client)) => {
                client.validate()?;
                PreparedConsent::NewClient(client.clone())
            }
        };

        check_schema(&payload, &schema)?;
        check_tracts(&payload)?;

        Ok(PreparedSubmission { payload, consent })
    }

    async fn attach_consent(&self, broker_id: BrokerId, consent: PreparedConsent) -> Result<AttachedConsent, ListingError> {
        match consent {
            PreparedConsent::Existing(id) => Ok(AttachedConsent { id, registered: None }),
            PreparedConsent::NewClient(client) => {
                let consent = self.consents.register_with_document(broker_id, client).await?;
                Ok(AttachedConsent { id: consent.id, registered: Some(consent) })
            }
        }
    }

    /// Withdraws a consent registered for a listing that was never written
    async fn release(&self, attached: AttachedConsent) {
        if let Some(consent) = attached.registered {
            if let Err(e) = self.consents.withdraw(&consent).await {
                error!(consent_id = %consent.id, error = %e, "Failed to withdraw consent for unwritten listing");
            }
        }
    }

    async fn after_submit(&self, listing: &Listing, consent_id: ConsentId, now: DateTime<Utc>) {
        let property_type = listing.property_type().unwrap_or(PropertyType::Other);
        self.record(ListingEvent::Submitted {
            event_id: EventId::new_v7(),
            listing_id: listing.id,
            broker_id: listing.broker_id,
            consent_id,
            property_type,
            timestamp: now,
        })
        .await;

        info!(
            listing_id = %listing.id,
            broker_id = %listing.broker_id,
            consent_id = %consent_id,
            property_type = %property_type,
            "Listing submitted for review"
        );
    }

    async fn load(&self, listing_id: ListingId) -> Result<Listing, ListingError> {
        self.listings.get_listing(listing_id, None).await.map_err(|e| {
            if e.is_not_found() {
                ListingError::NotFound(listing_id)
            } else {
                ListingError::Storage(e)
            }
        })
    }

    /// The audit trail is best effort; the state change already happened
    async fn record(&self, event: ListingEvent) {
        if let Err(e) = self.listings.record_event(&event, None).await {
            warn!(event_type = event.event_type(), listing_id = %event.listing_id(), error = %e, "Failed to record listing event");
        }
    }

    /// Logs a failure at the level its kind deserves
    fn report(&self, error: ListingError) -> ListingError {
        match &error {
            ListingError::UnknownPropertyType(value) => {
                error!(property_type = %value, "Unknown property type reached the listing workflow");
            }
            ListingError::Validation(v) => {
                warn!(code = %v.code(), field = v.field(), "Listing submission rejected");
            }
            ListingError::Storage(e) => {
                warn!(error = %e, "Listing storage failure");
            }
            _ => {}
        }
        error
    }
}

fn metadata_for(broker_id: BrokerId) -> OperationMetadata {
    OperationMetadata::default().initiated_by(broker_id.to_string())
}
