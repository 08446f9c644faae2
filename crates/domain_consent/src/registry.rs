//! Consent registry service
//!
//! Tracks each broker's consent-to-list agreements. The registry never
//! creates a verified consent; verification and revocation are exposed only
//! for the review authority.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use core_kernel::{BrokerId, Clock, ConsentId, OperationMetadata, ReviewerId};

use crate::consent::{ClientConsent, ClientContact, ConsentStatus, ConsentSummary};
use crate::error::ConsentError;
use crate::ports::{ConsentPort, ConsentQuery, DocumentStore, DocumentUpload};

/// Validity of a newly issued consent
pub const DEFAULT_VALIDITY_MONTHS: u32 = 12;

/// A new client captured alongside a listing submission
#[derive(Debug, Clone)]
pub struct NewClient {
    pub client_name: String,
    pub contact: ClientContact,
    pub document: Option<DocumentUpload>,
}

impl NewClient {
    /// Checks the client can be registered without touching storage
    pub fn validate(&self) -> Result<(), ConsentError> {
        if self.client_name.trim().is_empty() {
            return Err(ConsentError::missing_field("client_name"));
        }
        match &self.document {
            Some(document) if !document.is_empty() => {}
            _ => return Err(ConsentError::missing_field("document")),
        }
        self.contact.validate()
    }
}

pub struct ConsentRegistry {
    consents: Arc<dyn ConsentPort>,
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    validity_months: u32,
}

impl ConsentRegistry {
    pub fn new(
        consents: Arc<dyn ConsentPort>,
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            consents,
            documents,
            clock,
            validity_months: DEFAULT_VALIDITY_MONTHS,
        }
    }

    pub fn with_validity_months(mut self, months: u32) -> Self {
        self.validity_months = months;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Consents the broker may attach to a listing right now
    ///
    /// Only verified, unexpired consents are returned, soonest expiry first.
    pub async fn list_usable_consents(
        &self,
        broker_id: BrokerId,
    ) -> Result<Vec<ConsentSummary>, ConsentError> {
        let now = self.clock.now();
        let query = ConsentQuery::by_broker(broker_id).with_status(ConsentStatus::Verified);
        let mut summaries: Vec<ConsentSummary> = self
            .consents
            .find_consents(query, Some(metadata_for(broker_id)))
            .await?
            .into_iter()
            .filter(|consent| consent.is_usable(now))
            .map(|consent| consent.summarize(now))
            .collect();

        summaries.sort_by_key(|s| (s.expires_at, s.consent_id));
        Ok(summaries)
    }

    /// Records a consent whose document is already stored
    pub async fn register_new_consent(
        &self,
        broker_id: BrokerId,
        client_name: &str,
        document_reference: &str,
        contact: ClientContact,
    ) -> Result<ConsentId, ConsentError> {
        let consent = ClientConsent::issue(
            broker_id,
            client_name,
            contact,
            document_reference,
            self.clock.now(),
            self.validity_months,
        )?;

        self.consents
            .insert_consent(&consent, Some(metadata_for(broker_id)))
            .await?;

        info!(
            consent_id = %consent.id,
            broker_id = %broker_id,
            expires_at = %consent.expires_at,
            "Registered client consent"
        );
        Ok(consent.id)
    }

    /// Uploads the signed document, then records the consent
    ///
    /// The consent is built first so nothing is uploaded for a consent that
    /// could never be issued. Nothing is written if the upload fails. If the
    /// record cannot be written the uploaded document is removed again.
    pub async fn register_with_document(
        &self,
        broker_id: BrokerId,
        client: NewClient,
    ) -> Result<ClientConsent, ConsentError> {
        client.validate()?;
        let document = client
            .document
            .ok_or_else(|| ConsentError::missing_field("document"))?;

        let path = format!(
            "consents/{}/{}-{}",
            broker_id.as_uuid(),
            Uuid::new_v4(),
            document.safe_file_name()
        );
        let mut consent = ClientConsent::issue(
            broker_id,
            client.client_name,
            client.contact,
            path.clone(),
            self.clock.now(),
            self.validity_months,
        )?;

        let reference = self.documents.upload(&path, &document).await.map_err(|e| {
            warn!(broker_id = %broker_id, error = %e, "Consent document upload failed");
            ConsentError::Storage(e)
        })?;
        consent.document_reference = reference;

        if let Err(e) = self
            .consents
            .insert_consent(&consent, Some(metadata_for(broker_id)))
            .await
        {
            self.remove_document(&consent.document_reference).await;
            return Err(ConsentError::Storage(e));
        }

        info!(
            consent_id = %consent.id,
            broker_id = %broker_id,
            document_bytes = document.size(),
            "Registered client consent with uploaded document"
        );
        Ok(consent)
    }

    /// Undoes [`register_with_document`](Self::register_with_document)
    ///
    /// Only for a consent that nothing references yet, e.g. when the listing
    /// it was registered for could not be written.
    pub async fn withdraw(&self, consent: &ClientConsent) -> Result<(), ConsentError> {
        self.consents
            .delete_consent(consent.id, Some(metadata_for(consent.broker_id)))
            .await?;
        self.remove_document(&consent.document_reference).await;

        info!(consent_id = %consent.id, "Withdrew unused client consent");
        Ok(())
    }

    async fn remove_document(&self, reference: &str) {
        if let Err(e) = self.documents.remove(reference).await {
            warn!(reference = %reference, error = %e, "Failed to remove orphaned consent document");
        }
    }

    /// Loads a consent owned by `broker_id`
    pub async fn get_owned(
        &self,
        broker_id: BrokerId,
        consent_id: ConsentId,
    ) -> Result<ClientConsent, ConsentError> {
        let consent = self.get(consent_id).await?;
        if !consent.is_owned_by(broker_id) {
            return Err(ConsentError::NotOwner { consent_id, broker_id });
        }
        Ok(consent)
    }

    /// Re-checks a selected consent at the moment it is used
    pub async fn require_usable(
        &self,
        broker_id: BrokerId,
        consent_id: ConsentId,
    ) -> Result<ClientConsent, ConsentError> {
        let consent = self.get_owned(broker_id, consent_id).await?;
        let status = consent.effective_status(self.clock.now());
        if status != ConsentStatus::Verified {
            warn!(consent_id = %consent_id, status = %status, "Consent not usable");
            return Err(ConsentError::NotUsable { consent_id, status });
        }
        Ok(consent)
    }

    pub async fn get(&self, consent_id: ConsentId) -> Result<ClientConsent, ConsentError> {
        self.consents
            .get_consent(consent_id, None)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ConsentError::NotFound(consent_id)
                } else {
                    ConsentError::Storage(e)
                }
            })
    }

    /// Consents awaiting the review authority
    pub async fn list_pending_verification(&self) -> Result<Vec<ClientConsent>, ConsentError> {
        let now = self.clock.now();
        Ok(self
            .consents
            .find_consents(ConsentQuery::by_status(ConsentStatus::NotVerified), None)
            .await?
            .into_iter()
            .filter(|consent| consent.effective_status(now) == ConsentStatus::NotVerified)
            .collect())
    }

    /// Review authority marks a consent verified
    pub async fn verify(
        &self,
        consent_id: ConsentId,
        reviewer: ReviewerId,
    ) -> Result<ClientConsent, ConsentError> {
        let mut consent = self.get(consent_id).await?;
        consent.verify(reviewer, self.clock.now())?;
        self.consents.update_consent(&consent, None).await?;

        info!(consent_id = %consent_id, reviewer = %reviewer, "Consent verified");
        Ok(consent)
    }

    /// Review authority revokes a consent
    pub async fn expire(&self, consent_id: ConsentId) -> Result<ClientConsent, ConsentError> {
        let mut consent = self.get(consent_id).await?;
        consent.expire()?;
        self.consents.update_consent(&consent, None).await?;

        info!(consent_id = %consent_id, "Consent expired");
        Ok(consent)
    }
}

fn metadata_for(broker_id: BrokerId) -> OperationMetadata {
    OperationMetadata::default().initiated_by(broker_id.to_string())
}
