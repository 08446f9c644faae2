//! Client consent-to-list aggregate
//!
//! A consent authorizes a broker to market a client's property. It is issued
//! `not_verified`, becomes `verified` only through the review authority, and
//! lapses at a fixed expiry. Expiry is derived from time on every read: the
//! stored status alone is never trusted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BrokerId, ConsentId, ReviewerId, ValidityWindow};

use crate::error::ConsentError;

/// Verification status of a consent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentStatus {
    /// Uploaded, awaiting review
    NotVerified,
    /// Confirmed by the review authority
    Verified,
    /// Past its validity window or revoked
    Expired,
}

impl ConsentStatus {
    /// Returns the persisted label
    pub fn label(&self) -> &'static str {
        match self {
            ConsentStatus::NotVerified => "not_verified",
            ConsentStatus::Verified => "verified",
            ConsentStatus::Expired => "expired",
        }
    }

    fn can_transition_to(&self, target: ConsentStatus) -> bool {
        use ConsentStatus::*;
        matches!(
            (*self, target),
            (NotVerified, Verified) |
            (NotVerified, Expired) |
            (Verified, Expired)
        )
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConsentStatus {
    type Err = ConsentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "not_verified" => Ok(ConsentStatus::NotVerified),
            "verified" => Ok(ConsentStatus::Verified),
            "expired" => Ok(ConsentStatus::Expired),
            other => Err(ConsentError::UnknownStatus(other.to_string())),
        }
    }
}

/// Optional ways to reach the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ClientContact {
    pub fn new(email: Option<String>, phone: Option<String>) -> Self {
        Self {
            email: normalize(email),
            phone: normalize(phone),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }

    /// An email, when given, must at least look like one
    pub fn validate(&self) -> Result<(), ConsentError> {
        if let Some(email) = &self.email {
            let well_formed = email
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
                .unwrap_or(false);
            if !well_formed {
                return Err(ConsentError::InvalidContact(format!("malformed email: {email}")));
            }
        }
        Ok(())
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A client's consent-to-list agreement with a broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConsent {
    pub id: ConsentId,
    pub broker_id: BrokerId,
    pub client_name: String,
    pub client_contact: ClientContact,
    /// Reference returned by document storage, stored verbatim
    pub document_reference: String,
    status: ConsentStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub verified_by: Option<ReviewerId>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl ClientConsent {
    /// Issues a new consent valid for `validity_months` from `issued_at`
    ///
    /// The consent always starts `not_verified`.
    pub fn issue(
        broker_id: BrokerId,
        client_name: impl Into<String>,
        client_contact: ClientContact,
        document_reference: impl Into<String>,
        issued_at: DateTime<Utc>,
        validity_months: u32,
    ) -> Result<Self, ConsentError> {
        let client_name = client_name.into().trim().to_string();
        let document_reference = document_reference.into().trim().to_string();

        if client_name.is_empty() {
            return Err(ConsentError::missing_field("client_name"));
        }
        if document_reference.is_empty() {
            return Err(ConsentError::missing_field("document_reference"));
        }
        client_contact.validate()?;

        let window = ValidityWindow::for_months(issued_at, validity_months)?;

        Ok(Self {
            id: ConsentId::new_v7(),
            broker_id,
            client_name,
            client_contact,
            document_reference,
            status: ConsentStatus::NotVerified,
            created_at: window.starts_at,
            expires_at: window.expires_at,
            verified_by: None,
            verified_at: None,
        })
    }

    /// Rebuilds a consent from persisted columns
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ConsentId,
        broker_id: BrokerId,
        client_name: String,
        client_contact: ClientContact,
        document_reference: String,
        status: ConsentStatus,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        verified_by: Option<ReviewerId>,
        verified_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            broker_id,
            client_name,
            client_contact,
            document_reference,
            status,
            created_at,
            expires_at,
            verified_by,
            verified_at,
        }
    }

    /// Replaces the stored status
    pub fn with_stored_status(mut self, status: ConsentStatus) -> Self {
        self.status = status;
        self
    }

    /// The status as last written, without the expiry check
    pub fn stored_status(&self) -> ConsentStatus {
        self.status
    }

    /// The status that holds at `now`
    ///
    /// A consent is expired once `now >= expires_at`, whatever was stored.
    pub fn effective_status(&self, now: DateTime<Utc>) -> ConsentStatus {
        if self.status == ConsentStatus::Expired || self.validity().has_lapsed(now) {
            ConsentStatus::Expired
        } else {
            self.status
        }
    }

    /// Only verified, unexpired consents can back a listing
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == ConsentStatus::Verified
    }

    pub fn is_owned_by(&self, broker_id: BrokerId) -> bool {
        self.broker_id == broker_id
    }

    pub fn validity(&self) -> ValidityWindow {
        ValidityWindow {
            starts_at: self.created_at,
            expires_at: self.expires_at,
        }
    }

    pub fn days_until_expiration(&self, now: DateTime<Utc>) -> i64 {
        self.validity().days_remaining(now)
    }

    /// Review authority confirms the document
    pub fn verify(&mut self, reviewer: ReviewerId, now: DateTime<Utc>) -> Result<(), ConsentError> {
        self.transition(ConsentStatus::Verified, now)?;
        self.verified_by = Some(reviewer);
        self.verified_at = Some(now);
        Ok(())
    }

    /// Review authority revokes the consent
    pub fn expire(&mut self) -> Result<(), ConsentError> {
        let from = self.status;
        if !from.can_transition_to(ConsentStatus::Expired) {
            return Err(ConsentError::InvalidStatusTransition {
                from: from.to_string(),
                to: ConsentStatus::Expired.to_string(),
            });
        }
        self.status = ConsentStatus::Expired;
        Ok(())
    }

    fn transition(&mut self, target: ConsentStatus, now: DateTime<Utc>) -> Result<(), ConsentError> {
        let from = self.effective_status(now);
        if !from.can_transition_to(target) {
            return Err(ConsentError::InvalidStatusTransition {
                from: from.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        Ok(())
    }

    pub fn summarize(&self, now: DateTime<Utc>) -> ConsentSummary {
        ConsentSummary {
            consent_id: self.id,
            client_name: self.client_name.clone(),
            client_contact: self.client_contact.clone(),
            document_reference: self.document_reference.clone(),
            expires_at: self.expires_at,
            days_until_expiration: self.days_until_expiration(now),
        }
    }
}

/// What a broker sees when choosing a consent for a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentSummary {
    pub consent_id: ConsentId,
    pub client_name: String,
    pub client_contact: ClientContact,
    pub document_reference: String,
    pub expires_at: DateTime<Utc>,
    /// Drives the "expires soon" warning shown to the broker
    pub days_until_expiration: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn issued() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn consent() -> ClientConsent {
        ClientConsent::issue(
            BrokerId::new(),
            "Dana Whitfield",
            ClientContact::default(),
            "consents/a/b.pdf",
            issued(),
            12,
        )
        .unwrap()
    }

    #[test]
    fn test_issue_starts_not_verified() {
        let c = consent();
        assert_eq!(c.stored_status(), ConsentStatus::NotVerified);
        assert_eq!(c.expires_at, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_stored_verified_reads_expired_after_window() {
        let c = consent().with_stored_status(ConsentStatus::Verified);
        assert_eq!(c.effective_status(c.expires_at - Duration::seconds(1)), ConsentStatus::Verified);
        assert_eq!(c.effective_status(c.expires_at), ConsentStatus::Expired);
    }

    #[test]
    fn test_expire_twice_is_rejected() {
        let mut c = consent();
        c.expire().unwrap();
        assert!(matches!(c.expire(), Err(ConsentError::InvalidStatusTransition { .. })));
    }

    #[test]
    fn test_email_validation() {
        let bad = ClientContact::new(Some("no-at-sign".into()), None);
        assert!(bad.validate().is_err());
        let good = ClientContact::new(Some(" dana@example.com ".into()), Some("  ".into()));
        assert!(good.validate().is_ok());
        assert_eq!(good.phone, None);
    }
}
