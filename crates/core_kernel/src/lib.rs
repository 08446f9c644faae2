//! Core Kernel - Foundational types shared by the listing workflow
//!
//! This crate provides the building blocks used across all domain crates:
//! - Money types with precise decimal arithmetic
//! - Validity windows and injectable clocks
//! - Strongly-typed identifiers
//! - Port error and health-check types for adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{ValidityWindow, TemporalError, Clock, SystemClock, FixedClock};
pub use identifiers::{BrokerId, ReviewerId, ConsentId, ListingId, EventId};
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
    OperationMetadata,
};
