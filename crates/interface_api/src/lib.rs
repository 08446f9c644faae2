//! HTTP API Layer
//!
//! Axum surface for the listing workflow: brokers manage consents and
//! listings, the review authority verifies consents and decides on
//! submissions.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(service, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_listing::ListingService;

use crate::config::ApiConfig;
use crate::dto::consent::MAX_REQUEST_BYTES;
use crate::handlers::{consents, health, listings, review};
use crate::middleware::{audit_middleware, auth_middleware, require_admin};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<ListingService>,
    /// Adapters reported by the readiness probe
    pub health_checks: Vec<Arc<dyn HealthCheckable>>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(listings: Arc<ListingService>, config: ApiConfig) -> Self {
        Self {
            listings,
            health_checks: Vec::new(),
            config,
        }
    }

    pub fn with_health_check(mut self, adapter: Arc<dyn HealthCheckable>) -> Self {
        self.health_checks.push(adapter);
        self
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let consent_routes = Router::new()
        .route("/", post(consents::register))
        .route("/usable", get(consents::list_usable));

    let listing_routes = Router::new()
        .route("/", post(listings::create_draft).get(listings::list_listings))
        .route("/submit", post(listings::submit_new))
        .route("/:id", get(listings::get_listing).put(listings::save_draft))
        .route("/:id/submit", post(listings::submit_existing));

    let review_routes = Router::new()
        .route("/listings", get(review::pending_listings))
        .route("/listings/:id", post(review::review_listing))
        .route("/consents", get(review::pending_consents))
        .route("/consents/:id/verify", post(review::verify_consent))
        .route("/consents/:id/expire", post(review::expire_consent))
        .route_layer(axum_middleware::from_fn(require_admin));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/consents", consent_routes)
        .nest("/listings", listing_routes)
        .nest("/review", review_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
