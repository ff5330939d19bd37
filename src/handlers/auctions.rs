// region:    --- Imports
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::auctions::commands::{
    handle_create_auction, handle_delete_auction, CreateAuctionCommand,
};
use crate::auctions::time_remaining;
use crate::auth::Identity;
use crate::bidding::commands::{
    handle_buy_now, handle_place_bid, BuyNowCommand, PlaceBidCommand,
};
use crate::error::{MarketError, MarketResult};
use crate::handlers::AppState;
use crate::query;
use crate::query::handlers::AuctionWithListing;
// endregion: --- Imports

/// Auction detail plus the display-only countdown.
#[derive(Debug, Serialize)]
pub struct AuctionDetail {
    #[serde(flatten)]
    pub auction: AuctionWithListing,
    pub time_remaining: String,
}

// region:    --- Command Handlers

/// POST /bid
pub async fn place_bid(
    State(state): State<AppState>,
    identity: Identity,
    Json(cmd): Json<PlaceBidCommand>,
) -> MarketResult<impl IntoResponse> {
    let bid = handle_place_bid(cmd, identity.user_id(), state.ledger.as_ref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "bid placed successfully, you are now the highest bidder",
            "bid": bid,
        })),
    ))
}

/// POST /buy-now
pub async fn buy_now(
    State(state): State<AppState>,
    identity: Identity,
    Json(cmd): Json<BuyNowCommand>,
) -> MarketResult<impl IntoResponse> {
    let bid = handle_buy_now(cmd, identity.user_id(), state.ledger.as_ref()).await?;
    Ok(Json(json!({
        "message": "buy now executed, the auction is complete",
        "final_price": bid.bid_amount,
        "bid": bid,
    })))
}

/// POST /auctions
pub async fn create_auction(
    State(state): State<AppState>,
    identity: Identity,
    Json(cmd): Json<CreateAuctionCommand>,
) -> MarketResult<impl IntoResponse> {
    let auction = handle_create_auction(cmd, identity.user_id(), &state.db).await?;
    Ok((StatusCode::CREATED, Json(auction)))
}

/// DELETE /auctions/:id
pub async fn delete_auction(
    State(state): State<AppState>,
    identity: Identity,
    Path(auction_id): Path<i64>,
) -> MarketResult<impl IntoResponse> {
    handle_delete_auction(auction_id, identity.user_id(), &state.db).await?;
    Ok(Json(json!({ "message": "auction deleted" })))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// GET /auctions
pub async fn list_active_auctions(
    State(state): State<AppState>,
) -> MarketResult<Json<Vec<AuctionWithListing>>> {
    let auctions = query::handlers::list_active_auctions(&state.db).await?;
    Ok(Json(auctions))
}

/// GET /auctions/:id
pub async fn get_auction(
    State(state): State<AppState>,
    Path(auction_id): Path<i64>,
) -> MarketResult<Json<AuctionDetail>> {
    let auction = query::handlers::get_auction(&state.db, auction_id)
        .await?
        .ok_or(MarketError::NotFound("auction"))?;
    let time_remaining = time_remaining(auction.auction.end_time, Utc::now());
    Ok(Json(AuctionDetail {
        auction,
        time_remaining,
    }))
}

/// GET /auctions/:id/bids
pub async fn get_bid_history(
    State(state): State<AppState>,
    Path(auction_id): Path<i64>,
) -> MarketResult<impl IntoResponse> {
    let history = query::handlers::get_bid_history(&state.db, auction_id).await?;
    Ok(Json(history))
}

/// GET /auctions/:id/highest-bid
pub async fn get_highest_bid(
    State(state): State<AppState>,
    Path(auction_id): Path<i64>,
) -> MarketResult<impl IntoResponse> {
    let highest = query::handlers::get_highest_bid(&state.db, auction_id).await?;
    Ok(Json(json!({ "highest_bid": highest })))
}

// endregion: --- Query Handlers
