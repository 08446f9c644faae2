//! API error handling
//!
//! Domain errors are mapped onto HTTP statuses here and nowhere else.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_consent::ConsentError;
use domain_listing::ListingError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Input the broker must correct
    #[error("{code}: {field}")]
    Validation {
        code: String,
        field: String,
        details: Vec<String>,
    },

    /// Backing storage failed; the request may be retried
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(code: impl Into<String>, field: impl Into<String>) -> Self {
        ApiError::Validation {
            code: code.into(),
            field: field.into(),
            details: Vec::new(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_type, field, details) = match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found".to_string(), None, None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request".to_string(), None, None),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), None, None),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden".to_string(), None, None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict".to_string(), None, None),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large".to_string(), None, None),
            ApiError::Validation { code, field, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                code,
                Some(field),
                (!details.is_empty()).then_some(details),
            ),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable".to_string(), None, None),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error".to_string(), None, None),
        };

        let body = ErrorResponse {
            error: error_type,
            message,
            field,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::Validation(v) => ApiError::validation(v.code().as_str(), v.field()),
            ListingError::UnknownPropertyType(value) => {
                // The form offered a type the schemas do not know
                error!(property_type = %value, "Unknown property type submitted");
                ApiError::BadRequest(format!("unknown property type '{value}'"))
            }
            ListingError::Storage(e) => ApiError::from(e),
            ListingError::Consent(e) => ApiError::from(e),
            ListingError::NotFound(id) => ApiError::NotFound(format!("listing {id}")),
            ListingError::NotOwner { listing_id, .. } => {
                ApiError::Forbidden(format!("listing {listing_id} belongs to another broker"))
            }
            e @ ListingError::InvalidStatusTransition { .. } => ApiError::Conflict(e.to_string()),
            e @ ListingError::UnknownStatus(_) => ApiError::BadRequest(e.to_string()),
            ListingError::RejectionReasonRequired => ApiError::validation("missing_reason", "note"),
        }
    }
}

impl From<ConsentError> for ApiError {
    fn from(err: ConsentError) -> Self {
        match err {
            ConsentError::MissingField(field) => ApiError::validation("missing_field", field),
            ConsentError::InvalidContact(field) => ApiError::validation("invalid_contact", field),
            ConsentError::NotFound(id) => ApiError::NotFound(format!("consent {id}")),
            ConsentError::NotOwner { consent_id, .. } => {
                ApiError::Forbidden(format!("consent {consent_id} belongs to another broker"))
            }
            e @ (ConsentError::NotUsable { .. } | ConsentError::InvalidStatusTransition { .. }) => {
                ApiError::Conflict(e.to_string())
            }
            e @ (ConsentError::UnknownStatus(_) | ConsentError::Temporal(_)) => ApiError::BadRequest(e.to_string()),
            ConsentError::Storage(e) => ApiError::from(e),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => ApiError::NotFound(format!("{entity_type} {id}")),
            PortError::Conflict { message } => ApiError::Conflict(message),
            e if e.is_transient() => {
                error!(error = %e, "Storage failure");
                ApiError::Unavailable(e.to_string())
            }
            e => {
                error!(error = %e, "Unexpected port failure");
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingPermission(p) => ApiError::Forbidden(p),
            _ => ApiError::Unauthorized,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        let details = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        ApiError::Validation {
            code: "invalid_request".to_string(),
            field: fields.into_iter().next().unwrap_or_default(),
            details,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(rejection.body_text());
        }
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ListingId;
    use domain_listing::ValidationError;

    fn status(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_listing_errors_map_to_statuses() {
        assert_eq!(status(ListingError::from(ValidationError::missing_consent())), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status(ListingError::UnknownPropertyType("castle".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(ListingError::Storage(PortError::storage("down"))), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(ListingError::NotFound(ListingId::new())), StatusCode::NOT_FOUND);
        assert_eq!(
            status(ListingError::InvalidStatusTransition { from: "approved".into(), to: "draft".into() }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_names_the_field() {
        let err = ApiError::from(ListingError::from(ValidationError::schema_violation("hoa_fees")));
        match err {
            ApiError::Validation { code, field, .. } => {
                assert_eq!(code, "schema_violation");
                assert_eq!(field, "hoa_fees");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_transient_port_failure_is_internal() {
        assert_eq!(status(PortError::transformation("bad row")), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
