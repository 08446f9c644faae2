//! Review authority handlers
//!
//! Mounted behind the admin check; the token subject is the reviewer id.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use validator::Validate;

use core_kernel::{ConsentId, ListingId};

use super::parse_id;
use crate::auth::Claims;
use crate::dto::consent::ConsentResponse;
use crate::dto::listing::{ListingResponse, ListingSummaryResponse};
use crate::dto::review::ReviewListingRequest;
use crate::{error::ApiError, AppState};

pub async fn pending_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListingSummaryResponse>>, ApiError> {
    let listings = state.listings.list_pending_review().await?;
    Ok(Json(listings.iter().map(Into::into).collect()))
}

pub async fn review_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<ReviewListingRequest>, JsonRejection>,
) -> Result<Json<ListingResponse>, ApiError> {
    let reviewer = claims.reviewer_id()?;
    let listing_id: ListingId = parse_id(&id, "listing")?;
    let Json(request) = payload?;
    request.validate()?;
    let listing = state
        .listings
        .apply_review(listing_id, reviewer, request.decision, request.note)
        .await?;
    Ok(Json(listing.into()))
}

pub async fn pending_consents(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConsentResponse>>, ApiError> {
    let registry = state.listings.consents();
    let now = registry.clock().now();
    let consents = registry.list_pending_verification().await?;
    Ok(Json(consents.iter().map(|c| ConsentResponse::at(c, now)).collect()))
}

pub async fn verify_consent(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ConsentResponse>, ApiError> {
    let reviewer = claims.reviewer_id()?;
    let consent_id: ConsentId = parse_id(&id, "consent")?;
    let registry = state.listings.consents();
    let consent = registry.verify(consent_id, reviewer).await?;
    Ok(Json(ConsentResponse::at(&consent, registry.clock().now())))
}

pub async fn expire_consent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConsentResponse>, ApiError> {
    let consent_id: ConsentId = parse_id(&id, "consent")?;
    let registry = state.listings.consents();
    let consent = registry.expire(consent_id).await?;
    Ok(Json(ConsentResponse::at(&consent, registry.clock().now())))
}
