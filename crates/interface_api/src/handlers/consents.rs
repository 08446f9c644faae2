//! Broker-facing consent handlers

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::consent::{ConsentResponse, ConsentSummaryResponse, NewClientRequest};
use crate::{error::ApiError, AppState};

/// Consents the broker can attach right now, soonest expiry first
pub async fn list_usable(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ConsentSummaryResponse>>, ApiError> {
    let broker_id = claims.broker_id()?;
    let summaries = state.listings.consents().list_usable_consents(broker_id).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// Registers a client with their signed consent document
pub async fn register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<NewClientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConsentResponse>), ApiError> {
    let broker_id = claims.broker_id()?;
    let Json(request) = payload?;
    request.validate()?;

    let registry = state.listings.consents();
    let consent = registry
        .register_with_document(broker_id, request.into_new_client()?)
        .await?;
    let now = registry.clock().now();

    Ok((StatusCode::CREATED, Json(ConsentResponse::at(&consent, now))))
}
