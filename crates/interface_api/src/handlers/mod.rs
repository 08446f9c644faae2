//! Request handlers

pub mod consents;
pub mod health;
pub mod listings;
pub mod review;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses an id from a path segment, with or without its prefix
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("'{raw}' is not a valid {what} id")))
}
