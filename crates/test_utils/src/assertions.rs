//! Custom Test Assertions
//!
//! Assertion helpers that report the actual error or status on failure.

use rust_decimal::Decimal;

use domain_listing::{Listing, ListingError, ListingStatus, ValidationCode};

/// Asserts that `result` failed validation with `code` on `field`
pub fn assert_validation<T: std::fmt::Debug>(
    result: Result<T, ListingError>,
    code: ValidationCode,
    field: &str,
) {
    match result {
        Err(ListingError::Validation(e)) => {
            assert_eq!(e.code(), code, "wrong validation code: {e}");
            assert_eq!(e.field(), field, "wrong validation field: {e}");
        }
        other => panic!("Expected {code} on {field}, got {other:?}"),
    }
}

/// Asserts that `result` failed with `missing_consent`
pub fn assert_missing_consent<T: std::fmt::Debug>(result: Result<T, ListingError>) {
    assert_validation(result, ValidationCode::MissingConsent, "consent");
}

pub fn assert_status(listing: &Listing, expected: ListingStatus) {
    assert_eq!(
        listing.status, expected,
        "Expected listing {} to be {}, got {}",
        listing.id, expected, listing.status
    );
}

/// Asserts the published acreage total
pub fn assert_total_acreage(listing: &Listing, expected: Decimal) {
    let total = listing.payload.as_ref().and_then(|p| p.total_acreage);
    assert_eq!(
        total,
        Some(expected),
        "Expected total acreage {expected} on listing {}, got {total:?}",
        listing.id
    );
}

/// Asserts that the error is retryable storage trouble
pub fn assert_retryable<T: std::fmt::Debug>(result: Result<T, ListingError>) {
    match result {
        Err(e) => assert!(e.is_retryable(), "Expected a retryable error, got {e}"),
        Ok(value) => panic!("Expected a retryable error, got Ok({value:?})"),
    }
}
