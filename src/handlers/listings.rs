// region:    --- Imports
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Identity;
use crate::error::MarketResult;
use crate::handlers::AppState;
use crate::listings::{handle_create_listing, handle_delete_listing, CreateListingCommand, Listing};
use crate::query;
// endregion: --- Imports

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

/// POST /listings
pub async fn create_listing(
    State(state): State<AppState>,
    identity: Identity,
    Json(cmd): Json<CreateListingCommand>,
) -> MarketResult<impl IntoResponse> {
    let listing = handle_create_listing(cmd, identity.user_id(), &state.db).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// GET /listings?category=&status=
pub async fn browse_listings(
    State(state): State<AppState>,
    Query(params): Query<BrowseQuery>,
) -> MarketResult<Json<Vec<Listing>>> {
    let status = params.status.unwrap_or_else(|| "active".to_string());
    let category = params.category.filter(|c| c != "all");
    let listings = query::handlers::list_listings(&state.db, status, category).await?;
    Ok(Json(listings))
}

/// DELETE /listings/:id
pub async fn delete_listing(
    State(state): State<AppState>,
    identity: Identity,
    Path(listing_id): Path<i64>,
) -> MarketResult<impl IntoResponse> {
    handle_delete_listing(listing_id, identity.user_id(), &state.db).await?;
    Ok(Json(json!({ "message": "listing deleted" })))
}
