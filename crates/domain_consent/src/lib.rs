//! Consent Registry Domain
//!
//! Tracks client consent-to-list agreements per broker: who the client is,
//! where the signed document lives, whether the review authority has
//! verified it, and when it lapses.
//!
//! # Consent Lifecycle
//!
//! ```text
//! NotVerified -> Verified -> Expired
//!            \-> Expired
//! ```
//!
//! Expiry is also derived from time: a consent read at or after its
//! `expires_at` is expired whatever its stored status says.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = ConsentRegistry::new(consent_port, document_store, clock);
//! let consent = registry.register_with_document(broker_id, new_client).await?;
//! let usable = registry.list_usable_consents(broker_id).await?;
//! ```

pub mod consent;
pub mod error;
pub mod ports;
pub mod registry;

pub use consent::{ClientConsent, ClientContact, ConsentStatus, ConsentSummary};
pub use error::ConsentError;
pub use ports::{ConsentPort, ConsentQuery, DocumentStore, DocumentUpload};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockConsentPort, MockDocumentStore};
pub use registry::{ConsentRegistry, NewClient, DEFAULT_VALIDITY_MONTHS};
