// handlers/protected/properties.rs - /api/properties handlers

use axum::extract::{Path, State};

use crate::database::models::{NewProperty, Property, PropertyTransfer, PropertyUpdate, TransferRequest};
use crate::filter::{Listing, ListingQuery, Page, PROPERTY_LISTING};
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::services::transfer_service::TransferOutcome;
use crate::services::ProgressEvent;
use crate::state::AppState;

/// GET /api/properties - paged listing with search and checked-in filter
pub async fn property_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> ApiResult<Page<Property>> {
    let listing = Listing::new(PROPERTY_LISTING, &query, &state.listing)?;
    let page = state.properties().list(&listing).await?;
    Ok(ApiResponse::success(page))
}

/// POST /api/properties - owner must exist
pub async fn property_create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewProperty>,
) -> ApiResult<Property> {
    body.validate()?;
    let created = state.properties().create(body).await?;
    Ok(ApiResponse::created(created))
}

/// GET /api/properties/:id
pub async fn property_get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Property> {
    Ok(ApiResponse::success(state.properties().get(id).await?))
}

/// PUT /api/properties/:id - descriptive fields only
pub async fn property_update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<PropertyUpdate>,
) -> ApiResult<Property> {
    Ok(ApiResponse::success(state.properties().update(id, body).await?))
}

/// DELETE /api/properties/:id
pub async fn property_delete(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Property> {
    Ok(ApiResponse::success(state.properties().delete(id).await?))
}

/// POST /api/properties/:id/transfer - move to another shareholder
pub async fn property_transfer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<TransferRequest>,
) -> ApiResult<TransferOutcome> {
    body.validate()?;
    let outcome = state.transfers().transfer(id, &body.to_shareholder_id, body.transfer_date).await?;
    state.progress.publish(ProgressEvent::PropertyTransferred {
        property_id: id,
        to_shareholder_id: outcome.property.shareholder_id.clone(),
    });
    Ok(ApiResponse::success(outcome))
}

/// GET /api/properties/:id/transfers - newest first
pub async fn property_transfers(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<PropertyTransfer>> {
    state.properties().get(id).await?;
    Ok(ApiResponse::success(state.transfers().for_property(id).await?))
}
