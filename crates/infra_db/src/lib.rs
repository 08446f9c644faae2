//! Infrastructure layer
//!
//! PostgreSQL adapters for the consent and listing ports, built on SQLx, and
//! a local-disk store for signed consent documents.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresListingAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/listings")).await?;
//! run_migrations(&pool).await?;
//! let listings = PostgresListingAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;

pub use adapters::{LocalDocumentStore, PostgresConsentAdapter, PostgresListingAdapter};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
