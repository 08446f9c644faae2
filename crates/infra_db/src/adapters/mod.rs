//! Port adapters
//!
//! Each adapter implements a domain port, translating between domain models
//! and rows or files, and reports failures as `PortError`.

use std::time::Instant;

use sqlx::PgPool;

use core_kernel::HealthCheckResult;

pub mod consent;
pub mod documents;
pub mod listing;

pub use consent::{ConsentRow, PostgresConsentAdapter};
pub use documents::LocalDocumentStore;
pub use listing::{ListingRow, PostgresListingAdapter};

/// Runs `SELECT 1` against the pool
async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {e}")),
    }
}
