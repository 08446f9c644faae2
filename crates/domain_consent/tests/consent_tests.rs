//! Tests for the ClientConsent aggregate

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{BrokerId, ReviewerId};
use domain_consent::{ClientConsent, ClientContact, ConsentError, ConsentStatus};

fn issued_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()
}

fn new_consent() -> ClientConsent {
    ClientConsent::issue(
        BrokerId::new(),
        "Marisol Vega",
        ClientContact::new(Some("marisol@example.com".into()), Some("+1 512 555 0100".into())),
        "consents/brk/abc-consent.pdf",
        issued_at(),
        12,
    )
    .unwrap()
}

// ============================================================================
// Issuance
// ============================================================================

mod issuance {
    use super::*;

    #[test]
    fn test_issue_sets_twelve_month_window() {
        let consent = new_consent();
        assert_eq!(consent.created_at, issued_at());
        assert_eq!(consent.expires_at, Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap());
        assert_eq!(consent.stored_status(), ConsentStatus::NotVerified);
        assert!(consent.verified_by.is_none());
    }

    #[test]
    fn test_issue_trims_and_requires_name() {
        let result = ClientConsent::issue(
            BrokerId::new(),
            "   ",
            ClientContact::default(),
            "doc.pdf",
            issued_at(),
            12,
        );
        assert!(matches!(result, Err(ConsentError::MissingField(ref f)) if f == "client_name"));
    }

    #[test]
    fn test_issue_rejects_bad_email() {
        let result = ClientConsent::issue(
            BrokerId::new(),
            "Marisol Vega",
            ClientContact::new(Some("marisol.example.com".into()), None),
            "doc.pdf",
            issued_at(),
            12,
        );
        assert!(matches!(result, Err(ConsentError::InvalidContact(_))));
    }

    #[test]
    fn test_issue_rejects_zero_month_window() {
        let result = ClientConsent::issue(
            BrokerId::new(),
            "Marisol Vega",
            ClientContact::default(),
            "doc.pdf",
            issued_at(),
            0,
        );
        assert!(matches!(result, Err(ConsentError::Temporal(_))));
    }
}

// ============================================================================
// Derived expiration
// ============================================================================

mod effective_status {
    use super::*;

    #[test]
    fn test_expires_exactly_at_expiry_instant() {
        let consent = new_consent().with_stored_status(ConsentStatus::Verified);
        assert!(consent.is_usable(consent.expires_at - Duration::milliseconds(1)));
        assert!(!consent.is_usable(consent.expires_at));
        assert_eq!(consent.effective_status(consent.expires_at), ConsentStatus::Expired);
    }

    #[test]
    fn test_not_verified_is_never_usable() {
        let consent = new_consent();
        assert!(!consent.is_usable(issued_at() + Duration::days(1)));
    }

    #[test]
    fn test_stored_expired_wins_inside_window() {
        let consent = new_consent().with_stored_status(ConsentStatus::Expired);
        assert_eq!(consent.effective_status(issued_at()), ConsentStatus::Expired);
    }

    #[test]
    fn test_summary_reports_days_until_expiration() {
        let consent = new_consent().with_stored_status(ConsentStatus::Verified);
        let summary = consent.summarize(consent.expires_at - Duration::days(30));
        assert_eq!(summary.days_until_expiration, 30);
        assert_eq!(summary.client_name, "Marisol Vega");
    }
}

// ============================================================================
// Review authority transitions
// ============================================================================

mod review {
    use super::*;

    #[test]
    fn test_verify_records_reviewer() {
        let mut consent = new_consent();
        let reviewer = ReviewerId::new();
        let at = issued_at() + Duration::days(2);
        consent.verify(reviewer, at).unwrap();

        assert_eq!(consent.stored_status(), ConsentStatus::Verified);
        assert_eq!(consent.verified_by, Some(reviewer));
        assert_eq!(consent.verified_at, Some(at));
    }

    #[test]
    fn test_verify_twice_is_rejected() {
        let mut consent = new_consent();
        consent.verify(ReviewerId::new(), issued_at()).unwrap();
        let err = consent.verify(ReviewerId::new(), issued_at()).unwrap_err();
        assert!(matches!(err, ConsentError::InvalidStatusTransition { ref from, .. } if from == "verified"));
    }

    #[test]
    fn test_expire_from_not_verified() {
        let mut consent = new_consent();
        consent.expire().unwrap();
        assert_eq!(consent.stored_status(), ConsentStatus::Expired);
    }
}

// ============================================================================
// Status labels
// ============================================================================

mod labels {
    use super::*;

    #[test]
    fn test_status_round_trips_through_label() {
        for status in [ConsentStatus::NotVerified, ConsentStatus::Verified, ConsentStatus::Expired] {
            assert_eq!(status.label().parse::<ConsentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ConsentStatus::NotVerified).unwrap();
        assert_eq!(json, "\"not_verified\"");
    }

    #[test]
    fn test_unknown_status_label() {
        assert!(matches!("pending".parse::<ConsentStatus>(), Err(ConsentError::UnknownStatus(_))));
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn verified_consent_usable_iff_before_expiry(offset_secs in -40_000_000i64..40_000_000i64) {
            let consent = new_consent().with_stored_status(ConsentStatus::Verified);
            let now = consent.expires_at + Duration::seconds(offset_secs);
            let in_window = now >= consent.created_at && now < consent.expires_at;
            let before_expiry = now < consent.expires_at;
            prop_assert_eq!(consent.is_usable(now), before_expiry);
            if in_window {
                prop_assert!(consent.days_until_expiration(now) > 0);
            }
        }
    }
}
