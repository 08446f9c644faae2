//! Listing aggregate and publication state machine
//!
//! ```text
//! Draft -> Draft                       (save)
//! Draft -> PendingReview               (submit)
//! PendingReview -> Approved | Rejected (review authority)
//! Rejected -> Draft                    (edit)
//! Rejected -> PendingReview            (resubmit)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BrokerId, ConsentId, ListingId, ReviewerId};

use crate::draft::{ListingForm, ListingPayload};
use crate::error::ListingError;
use crate::property::PropertyType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    PendingReview,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::PendingReview => "pending_review",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
        }
    }

    /// The broker can change the listing's content
    pub fn is_editable(&self) -> bool {
        matches!(self, ListingStatus::Draft | ListingStatus::Rejected)
    }

    /// Visible on the marketplace
    pub fn is_published(&self) -> bool {
        matches!(self, ListingStatus::Approved)
    }

    pub fn can_transition_to(&self, target: ListingStatus) -> bool {
        use ListingStatus::*;
        matches!(
            (*self, target),
            (Draft, Draft) |
            (Draft, PendingReview) |
            (PendingReview, Approved) |
            (PendingReview, Rejected) |
            (Rejected, Draft) |
            (Rejected, PendingReview)
        )
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ListingStatus {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(ListingStatus::Draft),
            "pending_review" => Ok(ListingStatus::PendingReview),
            "approved" => Ok(ListingStatus::Approved),
            "rejected" => Ok(ListingStatus::Rejected),
            other => Err(ListingError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    fn target(&self) -> ListingStatus {
        match self {
            ReviewDecision::Approve => ListingStatus::Approved,
            ReviewDecision::Reject => ListingStatus::Rejected,
        }
    }
}

/// The review authority's verdict on a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub decision: ReviewDecision,
    pub reviewer: ReviewerId,
    pub note: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// A broker's listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub broker_id: BrokerId,
    /// Referenced, not owned
    pub consent_id: Option<ConsentId>,
    pub status: ListingStatus,
    /// Latest form state, possibly partial
    pub form: ListingForm,
    /// Normalized record, set when submitted
    pub payload: Option<ListingPayload>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub review: Option<ReviewOutcome>,
    /// Bumped on every save and submission
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Creates a draft; partial data is fine
    pub fn new_draft(broker_id: BrokerId, form: ListingForm, now: DateTime<Utc>) -> Result<Self, ListingError> {
        form.check_structure()?;
        Ok(Self {
            id: ListingId::new_v7(),
            broker_id,
            consent_id: None,
            status: ListingStatus::Draft,
            form,
            payload: None,
            submitted_at: None,
            review: None,
            revision: 1,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn property_type(&self) -> Option<PropertyType> {
        match &self.payload {
            Some(payload) => Some(payload.property_type()),
            None => self.form.property_type.parse().ok(),
        }
    }

    pub fn title(&self) -> &str {
        self.form.title.trim()
    }

    pub fn is_owned_by(&self, broker_id: BrokerId) -> bool {
        self.broker_id == broker_id
    }

    /// Stores new form state; a rejected listing goes back to draft
    pub fn save_draft(&mut self, form: ListingForm, now: DateTime<Utc>) -> Result<(), ListingError> {
        form.check_structure()?;
        self.transition(ListingStatus::Draft)?;
        self.form = form;
        self.payload = None;
        self.revision += 1;
        self.updated_at = now;
        Ok(())
    }

    /// Moves a validated submission into review
    ///
    /// Callers are responsible for having validated `payload`.
    pub fn submit(
        &mut self,
        form: ListingForm,
        payload: ListingPayload,
        consent_id: ConsentId,
        now: DateTime<Utc>,
    ) -> Result<(), ListingError> {
        self.transition(ListingStatus::PendingReview)?;
        self.form = form;
        self.payload = Some(payload);
        self.consent_id = Some(consent_id);
        self.submitted_at = Some(now);
        self.review = None;
        self.revision += 1;
        self.updated_at = now;
        Ok(())
    }

    /// Applies the review authority's decision
    pub fn apply_review(&mut self, outcome: ReviewOutcome) -> Result<(), ListingError> {
        let has_note = outcome
            .note
            .as_deref()
            .map(|n| !n.trim().is_empty())
            .unwrap_or(false);
        if outcome.decision == ReviewDecision::Reject && !has_note {
            return Err(ListingError::RejectionReasonRequired);
        }
        self.transition(outcome.decision.target())?;
        self.updated_at = outcome.decided_at;
        self.review = Some(outcome);
        Ok(())
    }

    fn transition(&mut self, target: ListingStatus) -> Result<(), ListingError> {
        if !self.status.can_transition_to(target) {
            return Err(ListingError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Listing {
        Listing::new_draft(BrokerId::new(), ListingForm::default(), Utc::now()).unwrap()
    }

    #[test]
    fn test_transitions() {
        use ListingStatus::*;
        assert!(Draft.can_transition_to(PendingReview));
        assert!(Rejected.can_transition_to(PendingReview));
        assert!(!Draft.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Draft));
        assert!(!PendingReview.can_transition_to(Draft));
    }

    #[test]
    fn test_pending_listing_cannot_be_saved() {
        let mut listing = draft();
        listing.status = ListingStatus::PendingReview;
        let result = listing.save_draft(ListingForm::default(), Utc::now());
        assert!(matches!(result, Err(ListingError::InvalidStatusTransition { .. })));
    }

    #[test]
    fn test_rejection_needs_reason() {
        let mut listing = draft();
        listing.status = ListingStatus::PendingReview;
        let result = listing.apply_review(ReviewOutcome {
            decision: ReviewDecision::Reject,
            reviewer: ReviewerId::new(),
            note: Some("  ".into()),
            decided_at: Utc::now(),
        });
        assert!(matches!(result, Err(ListingError::RejectionReasonRequired)));
        assert_eq!(listing.status, ListingStatus::PendingReview);
    }

    #[test]
    fn test_draft_with_unknown_type_is_rejected() {
        let form = ListingForm {
            property_type: "castle".into(),
            ..Default::default()
        };
        let result = Listing::new_draft(BrokerId::new(), form, Utc::now());
        assert!(matches!(result, Err(ListingError::UnknownPropertyType(_))));
    }
}
