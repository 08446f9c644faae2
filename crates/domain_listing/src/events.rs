//! Domain events emitted by the listing workflow
//!
//! Recorded through the listing port as an audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BrokerId, ConsentId, EventId, ListingId, ReviewerId};

use crate::property::PropertyType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingEvent {
    /// Draft content was stored
    DraftSaved {
        event_id: EventId,
        listing_id: ListingId,
        broker_id: BrokerId,
        revision: u32,
        timestamp: DateTime<Utc>,
    },

    /// Listing entered review
    Submitted {
        event_id: EventId,
        listing_id: ListingId,
        broker_id: BrokerId,
        consent_id: ConsentId,
        property_type: PropertyType,
        timestamp: DateTime<Utc>,
    },

    Approved {
        event_id: EventId,
        listing_id: ListingId,
        reviewer: ReviewerId,
        timestamp: DateTime<Utc>,
    },

    Rejected {
        event_id: EventId,
        listing_id: ListingId,
        reviewer: ReviewerId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl ListingEvent {
    pub fn event_id(&self) -> EventId {
        match self {
            ListingEvent::DraftSaved { event_id, .. }
            | ListingEvent::Submitted { event_id, .. }
            | ListingEvent::Approved { event_id, .. }
            | ListingEvent::Rejected { event_id, .. } => *event_id,
        }
    }

    pub fn listing_id(&self) -> ListingId {
        match self {
            ListingEvent::DraftSaved { listing_id, .. }
            | ListingEvent::Submitted { listing_id, .. }
            | ListingEvent::Approved { listing_id, .. }
            | ListingEvent::Rejected { listing_id, .. } => *listing_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ListingEvent::DraftSaved { timestamp, .. }
            | ListingEvent::Submitted { timestamp, .. }
            | ListingEvent::Approved { timestamp, .. }
            | ListingEvent::Rejected { timestamp, .. } => *timestamp,
        }
    }

    /// Stable name used in the audit table
    pub fn event_type(&self) -> &'static str {
        match self {
            ListingEvent::DraftSaved { .. } => "draft_saved",
            ListingEvent::Submitted { .. } => "submitted",
            ListingEvent::Approved { .. } => "approved",
            ListingEvent::Rejected { .. } => "rejected",
        }
    }
}
