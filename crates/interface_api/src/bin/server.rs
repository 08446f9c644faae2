//! Listing API server
//!
//! ```bash
//! API_DATABASE_URL=postgres://localhost/listings \
//! API_DOCUMENT_ROOT=/var/lib/listings/documents \
//! cargo run --bin listing-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DOCUMENT_ROOT` - Directory for signed consent documents
//! * `API_CONSENT_VALIDITY_MONTHS` - Validity of new consents (default: 12)
//! * `API_LOG_LEVEL` - trace, debug, info, warn, error (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_consent::ConsentRegistry;
use domain_listing::ListingService;
use infra_db::{
    create_pool, run_migrations, DatabaseConfig, LocalDocumentStore, PostgresConsentAdapter,
    PostgresListingAdapter,
};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("loading API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        document_root = %config.document_root,
        "Starting listing API server"
    );

    let pool = create_pool(DatabaseConfig::new(config.database_url.clone()))
        .await
        .context("connecting to database")?;
    run_migrations(&pool).await.context("running migrations")?;

    let consent_store = Arc::new(PostgresConsentAdapter::new(pool.clone()));
    let listing_store = Arc::new(PostgresListingAdapter::new(pool));
    let documents = Arc::new(LocalDocumentStore::new(&config.document_root));

    let registry = ConsentRegistry::new(
        consent_store.clone(),
        documents.clone(),
        Arc::new(SystemClock),
    )
    .with_validity_months(config.consent_validity_months);
    let service = ListingService::new(listing_store.clone(), Arc::new(registry));

    let state = AppState::new(Arc::new(service), config.clone())
        .with_health_check(consent_store)
        .with_health_check(listing_store)
        .with_health_check(documents);
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("parsing server address")?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
