//! Listing domain errors
//!
//! Three kinds of failure reach the submission boundary:
//!
//! - [`ValidationError`]: the broker must correct input and resubmit
//! - [`ListingError::UnknownPropertyType`]: the form and the schemas have drifted apart
//! - [`ListingError::Storage`]: persistence or document storage failed; retryable

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use core_kernel::{BrokerId, ListingId, PortError};
use domain_consent::ConsentError;

/// Machine-readable reason for a rejected submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    MissingTitle,
    MissingConsent,
    SchemaViolation,
    InvalidTract,
    MissingPropertyType,
    InvalidListingMode,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::MissingTitle => "missing_title",
            ValidationCode::MissingConsent => "missing_consent",
            ValidationCode::SchemaViolation => "schema_violation",
            ValidationCode::InvalidTract => "invalid_tract",
            ValidationCode::MissingPropertyType => "missing_property_type",
            ValidationCode::InvalidListingMode => "invalid_listing_mode",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-correctable defect naming the offending field or rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {field}")]
pub struct ValidationError {
    code: ValidationCode,
    field: String,
}

impl ValidationError {
    pub fn new(code: ValidationCode, field: impl Into<String>) -> Self {
        Self {
            code,
            field: field.into(),
        }
    }

    pub fn missing_title(field: impl Into<String>) -> Self {
        Self::new(ValidationCode::MissingTitle, field)
    }

    pub fn missing_consent() -> Self {
        Self::new(ValidationCode::MissingConsent, "consent")
    }

    pub fn schema_violation(field: impl Into<String>) -> Self {
        Self::new(ValidationCode::SchemaViolation, field)
    }

    pub fn invalid_tract(field: impl Into<String>) -> Self {
        Self::new(ValidationCode::InvalidTract, field)
    }

    pub fn missing_property_type() -> Self {
        Self::new(ValidationCode::MissingPropertyType, "property_type")
    }

    pub fn invalid_listing_mode(value: impl fmt::Display) -> Self {
        Self::new(ValidationCode::InvalidListingMode, format!("listing_mode={value}"))
    }

    pub fn code(&self) -> ValidationCode {
        self.code
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

/// Errors that can occur in the listing domain
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Property type outside the closed enumeration
    #[error("Unknown property type: {0}")]
    UnknownPropertyType(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),

    #[error("Consent error: {0}")]
    Consent(ConsentError),

    #[error("Listing not found: {0}")]
    NotFound(ListingId),

    #[error("Listing {listing_id} is not owned by broker {broker_id}")]
    NotOwner {
        listing_id: ListingId,
        broker_id: BrokerId,
    },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStatusTransition {
        from: String,
        to: String,
    },

    #[error("Unknown listing status: {0}")]
    UnknownStatus(String),

    #[error("A rejection must include a reason")]
    RejectionReasonRequired,
}

impl ListingError {
    /// True only for storage failures; everything else needs different input
    pub fn is_retryable(&self) -> bool {
        match self {
            ListingError::Storage(_) => true,
            ListingError::Consent(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// The validation failure, if this is one
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ListingError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConsentError> for ListingError {
    /// Unusable or incomplete consents surface as `missing_consent`
    fn from(error: ConsentError) -> Self {
        match error {
            ConsentError::Storage(e) => ListingError::Storage(e),
            e if e.is_unusable_consent() => ValidationError::missing_consent().into(),
            ConsentError::MissingField(_) => ValidationError::missing_consent().into(),
            other => ListingError::Consent(other),
        }
    }
}
