// handlers/protected/shareholders.rs - /api/shareholders handlers

use axum::extract::{Path, State};

use crate::database::models::{NewShareholder, Shareholder, ShareholderDetail, ShareholderSummary, ShareholderUpdate};
use crate::filter::{Listing, ListingQuery, Page, SHAREHOLDER_LISTING};
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::services::shareholder_service::DeletedShareholder;
use crate::state::AppState;

/// GET /api/shareholders - paged listing with search and checked-in filter
pub async fn shareholder_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> ApiResult<Page<ShareholderSummary>> {
    let listing = Listing::new(SHAREHOLDER_LISTING, &query, &state.listing)?;
    let page = state.shareholders().list(&listing).await?;
    Ok(ApiResponse::success(page))
}

/// POST /api/shareholders
pub async fn shareholder_create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewShareholder>,
) -> ApiResult<Shareholder> {
    body.validate()?;
    let created = state.shareholders().create(body).await?;
    Ok(ApiResponse::created(created))
}

/// GET /api/shareholders/:shareholder_id - shareholder with properties
pub async fn shareholder_get(
    State(state): State<AppState>,
    Path(shareholder_id): Path<String>,
) -> ApiResult<ShareholderDetail> {
    let detail = state.shareholders().get(&shareholder_id).await?;
    Ok(ApiResponse::success(detail))
}

/// PUT /api/shareholders/:shareholder_id - partial update
pub async fn shareholder_update(
    State(state): State<AppState>,
    Path(shareholder_id): Path<String>,
    ApiJson(body): ApiJson<ShareholderUpdate>,
) -> ApiResult<Shareholder> {
    body.validate()?;
    let updated = state.shareholders().update(&shareholder_id, body).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/shareholders/:shareholder_id - removes its properties too
pub async fn shareholder_delete(
    State(state): State<AppState>,
    Path(shareholder_id): Path<String>,
) -> ApiResult<DeletedShareholder> {
    let deleted = state.shareholders().delete(&shareholder_id).await?;
    Ok(ApiResponse::success(deleted))
}
