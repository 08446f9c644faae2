//! Pre-built Test Fixtures
//!
//! Predictable timestamps and documents, plus fake client details for tests
//! that only need *some* plausible client.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use once_cell::sync::Lazy;

use domain_consent::{ClientContact, DocumentUpload, NewClient};

/// Reference "now" shared by every harness (2 April 2024, 15:00 UTC)
pub static REFERENCE_NOW: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2024, 4, 2, 15, 0, 0).unwrap());

/// Secret the API tests sign tokens with
pub const TEST_JWT_SECRET: &str = "listing-test-secret";

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn now() -> DateTime<Utc> {
        *REFERENCE_NOW
    }

    pub fn days_from_now(days: i64) -> DateTime<Utc> {
        *REFERENCE_NOW + Duration::days(days)
    }

    pub fn days_ago(days: i64) -> DateTime<Utc> {
        *REFERENCE_NOW - Duration::days(days)
    }
}

/// Fixture for signed consent documents
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// A small signed PDF
    pub fn signed_pdf() -> DocumentUpload {
        DocumentUpload::new(
            "signed-consent.pdf",
            Some("application/pdf".to_string()),
            b"%PDF-1.7 signed listing consent".to_vec(),
        )
    }

    pub fn empty() -> DocumentUpload {
        DocumentUpload::new("empty.pdf", None, Vec::new())
    }
}

/// Fake client details
pub struct ClientFixtures;

impl ClientFixtures {
    pub fn name() -> String {
        Name().fake()
    }

    pub fn email() -> String {
        SafeEmail().fake()
    }

    pub fn phone() -> String {
        PhoneNumber().fake()
    }

    pub fn contact() -> ClientContact {
        ClientContact::new(Some(Self::email()), Some(Self::phone()))
    }

    /// A new client carrying a signed document
    pub fn new_client() -> NewClient {
        NewClient {
            client_name: Self::name(),
            contact: ClientContact::new(Some(Self::email()), None),
            document: Some(DocumentFixtures::signed_pdf()),
        }
    }

    /// A new client who has not attached the signed document
    pub fn new_client_without_document() -> NewClient {
        NewClient {
            document: None,
            ..Self::new_client()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporal_fixtures_ordering() {
        assert!(TemporalFixtures::days_ago(1) < TemporalFixtures::now());
        assert!(TemporalFixtures::now() < TemporalFixtures::days_from_now(1));
    }

    #[test]
    fn test_fake_client_is_usable() {
        let client = ClientFixtures::new_client();
        assert!(!client.client_name.trim().is_empty());
        assert!(client.contact.validate().is_ok());
        assert!(client.document.is_some_and(|d| !d.is_empty()));
    }
}
