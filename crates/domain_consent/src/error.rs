//! Consent domain errors

use thiserror::Error;

use core_kernel::{BrokerId, ConsentId, PortError, TemporalError};

use crate::consent::ConsentStatus;

/// Errors that can occur in the consent registry
#[derive(Debug, Error)]
pub enum ConsentError {
    /// A required registration field is empty
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Contact details are malformed
    #[error("Invalid contact: {0}")]
    InvalidContact(String),

    /// Consent does not exist
    #[error("Consent not found: {0}")]
    NotFound(ConsentId),

    /// Consent belongs to a different broker
    #[error("Consent {consent_id} is not owned by broker {broker_id}")]
    NotOwner {
        consent_id: ConsentId,
        broker_id: BrokerId,
    },

    /// Consent exists but cannot back a listing right now
    #[error("Consent {consent_id} is not usable ({status})")]
    NotUsable {
        consent_id: ConsentId,
        status: ConsentStatus,
    },

    /// Invalid status transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStatusTransition {
        from: String,
        to: String,
    },

    /// Unrecognised status label
    #[error("Unknown consent status: {0}")]
    UnknownStatus(String),

    /// Validity window could not be computed
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// Persistence or document storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl ConsentError {
    /// Creates a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        ConsentError::MissingField(field.into())
    }

    /// True for failures the caller may retry unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConsentError::Storage(_))
    }

    /// True when the consent cannot be attached to a listing
    ///
    /// Covers missing, foreign and unusable consents alike so that callers
    /// never learn about consents belonging to other brokers.
    pub fn is_unusable_consent(&self) -> bool {
        matches!(
            self,
            ConsentError::NotFound(_) | ConsentError::NotOwner { .. } | ConsentError::NotUsable { .. }
        )
    }
}
