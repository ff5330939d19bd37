// region:    --- Imports
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::auth::Identity;
use crate::error::MarketResult;
use crate::events::Event;
use crate::handlers::AppState;
use crate::listings::Listing;
use crate::query;
use crate::query::handlers::{AuctionWithListing, Profile};
// endregion: --- Imports

/// Everything the dashboard page needs in one round trip.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub profile: Option<Profile>,
    pub listings: Vec<Listing>,
    pub auctions: Vec<AuctionWithListing>,
    pub events: Vec<Event>,
}

/// GET /dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    identity: Identity,
) -> MarketResult<Json<DashboardResponse>> {
    let user_id = identity.user_id();
    let profile = query::handlers::get_profile(&state.db, user_id).await?;
    let listings = query::handlers::my_listings(&state.db, user_id).await?;
    let auctions = query::handlers::my_auctions(&state.db, user_id).await?;
    let events = query::handlers::my_events(&state.db, user_id).await?;

    Ok(Json(DashboardResponse {
        profile,
        listings,
        auctions,
        events,
    }))
}

/// GET /rsvps
pub async fn my_rsvps(
    State(state): State<AppState>,
    identity: Identity,
) -> MarketResult<impl IntoResponse> {
    let rsvps = query::handlers::my_rsvps(&state.db, identity.user_id()).await?;
    Ok(Json(rsvps))
}
