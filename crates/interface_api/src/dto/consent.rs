//! Consent DTOs

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{BrokerId, ConsentId};
use domain_consent::{ClientConsent, ClientContact, ConsentStatus, ConsentSummary, DocumentUpload, NewClient};

use crate::error::ApiError;

/// Largest accepted consent document, before base64 encoding
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Largest accepted request body: a maximal document once base64-encoded,
/// plus room for the rest of the form
pub const MAX_REQUEST_BYTES: usize = MAX_DOCUMENT_BYTES.div_ceil(3) * 4 + 1024 * 1024;

/// A signed consent document, base64-encoded
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocumentPayload {
    #[validate(length(min = 1, max = 255, message = "File name must be between 1 and 255 characters"))]
    pub file_name: String,
    pub content_type: Option<String>,
    pub content_base64: String,
}

impl DocumentPayload {
    pub fn decode(&self) -> Result<DocumentUpload, ApiError> {
        let bytes = general_purpose::STANDARD
            .decode(self.content_base64.trim())
            .map_err(|_| ApiError::validation("invalid_document", "document.content_base64"))?;
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(ApiError::validation("document_too_large", "document.content_base64"));
        }
        Ok(DocumentUpload::new(self.file_name.clone(), self.content_type.clone(), bytes))
    }
}

/// A client registered together with their signed consent
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewClientRequest {
    #[validate(length(max = 200, message = "Client name must be at most 200 characters"))]
    pub client_name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(nested)]
    pub document: Option<DocumentPayload>,
}

impl NewClientRequest {
    /// Decodes the document; a missing one is left for the registry to reject
    pub fn into_new_client(self) -> Result<NewClient, ApiError> {
        let document = self.document.as_ref().map(DocumentPayload::decode).transpose()?;
        Ok(NewClient {
            client_name: self.client_name,
            contact: ClientContact::new(self.email, self.phone),
            document,
        })
    }
}

/// Entry of the broker's usable-consent list
#[derive(Debug, Serialize)]
pub struct ConsentSummaryResponse {
    pub consent_id: ConsentId,
    pub client_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub document_reference: String,
    pub expires_at: DateTime<Utc>,
    pub days_until_expiration: i64,
    /// Shown as a warning when renewal is due within 30 days
    pub expires_soon: bool,
}

impl From<ConsentSummary> for ConsentSummaryResponse {
    fn from(summary: ConsentSummary) -> Self {
        Self {
            consent_id: summary.consent_id,
            client_name: summary.client_name,
            email: summary.client_contact.email,
            phone: summary.client_contact.phone,
            document_reference: summary.document_reference,
            expires_at: summary.expires_at,
            days_until_expiration: summary.days_until_expiration,
            expires_soon: summary.days_until_expiration <= 30,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub consent_id: ConsentId,
    pub broker_id: BrokerId,
    pub client_name: String,
    pub document_reference: String,
    /// Status at the time of the response
    pub status: ConsentStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl ConsentResponse {
    pub fn at(consent: &ClientConsent, now: DateTime<Utc>) -> Self {
        Self {
            consent_id: consent.id,
            broker_id: consent.broker_id,
            client_name: consent.client_name.clone(),
            document_reference: consent.document_reference.clone(),
            status: consent.effective_status(now),
            created_at: consent.created_at,
            expires_at: consent.expires_at,
            verified_at: consent.verified_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(content: &str) -> DocumentPayload {
        DocumentPayload {
            file_name: "consent.pdf".into(),
            content_type: Some("application/pdf".into()),
            content_base64: content.into(),
        }
    }

    #[test]
    fn test_document_decodes() {
        let upload = document("JVBERi0xLjc=").decode().unwrap();
        assert_eq!(upload.bytes, b"%PDF-1.7");
    }

    #[test]
    fn test_bad_base64_is_a_validation_error() {
        assert!(matches!(document("%%%").decode(), Err(ApiError::Validation { .. })));
    }

    #[test]
    fn test_invalid_email_fails_validation() {
        let request = NewClientRequest {
            client_name: "Ana".into(),
            email: Some("not-an-email".into()),
            phone: None,
            document: None,
        };
        assert!(request.validate().is_err());
    }
}
