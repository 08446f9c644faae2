//! Broker-facing listing handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::ListingId;
use domain_listing::ListingForm;

use super::parse_id;
use crate::auth::Claims;
use crate::dto::listing::{ListingResponse, ListingSummaryResponse, SubmitListingRequest};
use crate::{error::ApiError, AppState};

/// Creates a draft from partial form data
pub async fn create_draft(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<ListingForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ListingResponse>), ApiError> {
    let broker_id = claims.broker_id()?;
    let Json(form) = payload?;
    let listing = state.listings.create_draft(broker_id, form).await?;
    Ok((StatusCode::CREATED, Json(listing.into())))
}

pub async fn list_listings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ListingSummaryResponse>>, ApiError> {
    let broker_id = claims.broker_id()?;
    let listings = state.listings.list_for_broker(broker_id).await?;
    Ok(Json(listings.iter().map(Into::into).collect()))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ListingResponse>, ApiError> {
    let broker_id = claims.broker_id()?;
    let listing_id: ListingId = parse_id(&id, "listing")?;
    let listing = state.listings.get(broker_id, listing_id).await?;
    Ok(Json(listing.into()))
}

/// Saves form state on a draft or rejected listing
pub async fn save_draft(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<ListingForm>, JsonRejection>,
) -> Result<Json<ListingResponse>, ApiError> {
    let broker_id = claims.broker_id()?;
    let listing_id: ListingId = parse_id(&id, "listing")?;
    let Json(form) = payload?;
    let listing = state.listings.save_draft(broker_id, listing_id, form).await?;
    Ok(Json(listing.into()))
}

/// Creates and submits a listing in one request
pub async fn submit_new(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SubmitListingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ListingResponse>), ApiError> {
    let broker_id = claims.broker_id()?;
    let Json(request) = payload?;
    request.validate()?;
    let listing = state
        .listings
        .submit_new(broker_id, request.into_submission()?)
        .await?;
    Ok((StatusCode::CREATED, Json(listing.into())))
}

/// Submits an existing draft or resubmits a rejected listing
pub async fn submit_existing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<SubmitListingRequest>, JsonRejection>,
) -> Result<Json<ListingResponse>, ApiError> {
    let broker_id = claims.broker_id()?;
    let listing_id: ListingId = parse_id(&id, "listing")?;
    let Json(request) = payload?;
    request.validate()?;
    let listing = state
        .listings
        .submit_existing(broker_id, listing_id, request.into_submission()?)
        .await?;
    Ok(Json(listing.into()))
}
