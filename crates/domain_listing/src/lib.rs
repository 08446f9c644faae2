//! Listing Submission Domain
//!
//! Turns a broker's form into a marketplace listing, gated by a client's
//! consent-to-list agreement and shaped by property-type schemas.
//!
//! # Components
//!
//! - **Schema resolver** ([`property`]): property type + mode to field contract
//! - **Payloads** ([`details`]): one tagged variant per property type
//! - **Tract aggregator** ([`tract`]): per-parcel pricing and acreage roll-up
//! - **Draft builder** ([`draft`]): form text to normalized payload
//! - **Publication** ([`listing`], [`publication`]): lifecycle and submission checks
//! - **Service** ([`service`]): orchestration over the ports
//!
//! # Listing Lifecycle
//!
//! ```text
//! Draft -> PendingReview -> Approved
//!                       \-> Rejected -> Draft | PendingReview
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let service = ListingService::new(listing_port, consent_registry);
//! let listing = service
//!     .submit_new(broker_id, Submission { form, consent: Some(ConsentSelection::Existing(id)) })
//!     .await?;
//! assert_eq!(listing.status, ListingStatus::PendingReview);
//! ```

pub mod property;
pub mod details;
pub mod tract;
pub mod draft;
pub mod listing;
pub mod publication;
pub mod events;
pub mod error;
pub mod ports;
pub mod service;

pub use property::{
    resolve, resolve_labels, FieldRule, ListingMode, PricingField, PropertyField, PropertySchema,
    PropertyType,
};
pub use details::{FieldValue, PropertyDetails};
pub use tract::{recompute_total, Tract, TractPricing, TractSet};
pub use draft::{
    build, parse_count, parse_date, parse_decimal, parse_money, ListingForm, ListingPayload,
    Location, PricingTerms, TractInput,
};
pub use listing::{Listing, ListingStatus, ReviewDecision, ReviewOutcome};
pub use events::ListingEvent;
pub use publication::{check_payload, check_schema, check_title, check_tracts};
pub use error::{ListingError, ValidationCode, ValidationError};
pub use ports::{ListingPort, ListingQuery};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockListingPort;
pub use service::{ConsentSelection, ListingService, Submission};
