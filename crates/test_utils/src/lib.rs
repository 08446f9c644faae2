//! Test Utilities Crate
//!
//! Shared test infrastructure for the listing workflow test suites.
//!
//! # Modules
//!
//! - `fixtures`: Fixed timestamps, documents and fake client data
//! - `builders`: Builders for listing forms and consents
//! - `harness`: The listing service wired to in-memory ports
//! - `assertions`: Assertion helpers for workflow errors
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod harness;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use harness::*;
pub use assertions::*;
pub use generators::*;
