//! Listing DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{BrokerId, ConsentId, ListingId};
use domain_listing::{ConsentSelection, Listing, ListingForm, ListingPayload, ListingStatus, ReviewOutcome, Submission};

use super::consent::NewClientRequest;
use crate::error::ApiError;

/// Submit request: the form plus exactly one way of backing it with consent
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "one_consent_choice"))]
pub struct SubmitListingRequest {
    #[serde(default)]
    pub form: ListingForm,
    /// A consent from the usable list
    pub consent_id: Option<ConsentId>,
    /// A client registered with this submission
    #[validate(nested)]
    pub new_client: Option<NewClientRequest>,
}

fn one_consent_choice(request: &SubmitListingRequest) -> Result<(), ValidationError> {
    if request.consent_id.is_some() && request.new_client.is_some() {
        let mut error = ValidationError::new("conflicting_consent");
        error.message = Some("Choose an existing consent or a new client, not both".into());
        return Err(error);
    }
    Ok(())
}

impl SubmitListingRequest {
    pub fn into_submission(self) -> Result<Submission, ApiError> {
        let consent = match (self.consent_id, self.new_client) {
            (Some(id), None) => Some(ConsentSelection::Existing(id)),
            (None, Some(client)) => Some(ConsentSelection::NewClient(client.into_new_client()?)),
            (None, None) => None,
            (Some(_), Some(_)) => {
                return Err(ApiError::BadRequest("choose an existing consent or a new client, not both".into()))
            }
        };
        Ok(Submission {
            form: self.form,
            consent,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub id: ListingId,
    pub broker_id: BrokerId,
    pub consent_id: Option<ConsentId>,
    pub status: ListingStatus,
    pub title: String,
    pub revision: u32,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub form: ListingForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<ListingPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewOutcome>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            title: listing.title().to_string(),
            id: listing.id,
            broker_id: listing.broker_id,
            consent_id: listing.consent_id,
            status: listing.status,
            revision: listing.revision,
            submitted_at: listing.submitted_at,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
            form: listing.form,
            payload: listing.payload,
            review: listing.review,
        }
    }
}

/// Row of a listing table
#[derive(Debug, Serialize)]
pub struct ListingSummaryResponse {
    pub id: ListingId,
    pub status: ListingStatus,
    pub title: String,
    pub property_type: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Listing> for ListingSummaryResponse {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            status: listing.status,
            title: listing.title().to_string(),
            property_type: listing.property_type().map(|t| t.label().to_string()),
            updated_at: listing.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_consent_choices_fail_validation() {
        let request: SubmitListingRequest = serde_json::from_value(serde_json::json!({
            "consent_id": ConsentId::new(),
            "new_client": { "client_name": "Ana" }
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_no_consent_is_left_to_the_workflow() {
        let request: SubmitListingRequest = serde_json::from_value(serde_json::json!({
            "form": { "property_type": "land", "title": "Lot 4" }
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        let submission = request.into_submission().unwrap();
        assert!(submission.consent.is_none());
        assert_eq!(submission.form.title, "Lot 4");
    }
}
