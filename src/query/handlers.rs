// region:    --- Imports
use super::queries;
use crate::auctions::{Auction, Bid};
use crate::community::CommunityPost;
use crate::database::DatabaseManager;
use crate::error::MarketResult;
use crate::events::{Event, EventAttendee};
use crate::listings::Listing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- Read Models

/// Auction ledger state with its listing summary.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuctionWithListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub auction: Auction,
    pub listing_title: String,
    pub listing_image_urls: Vec<String>,
    pub listing_price: i64,
}

/// One bid log entry with the bidder's display name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BidHistoryEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub bid: Bid,
    pub bidder_username: Option<String>,
}

/// One RSVP row with the attendee's display name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AttendeeEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attendee: EventAttendee,
    pub attendee_username: Option<String>,
}

/// One feed post with the author's display name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PostEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: CommunityPost,
    pub author_username: Option<String>,
}

/// Profile summary shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub username: String,
    pub full_name: Option<String>,
}

/// One of the caller's RSVPs joined with its event.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RsvpWithEvent {
    pub rsvp_id: i64,
    pub rsvp_created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
}

// endregion: --- Read Models

// region:    --- Query Handlers

/// Active auctions for the auctions page.
pub async fn list_active_auctions(
    db_manager: &DatabaseManager,
) -> MarketResult<Vec<AuctionWithListing>> {
    info!("{:<12} --> list active auctions", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, AuctionWithListing>(queries::LIST_ACTIVE_AUCTIONS)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(rows)
            })
        })
        .await
}

/// One auction with its listing, any status.
pub async fn get_auction(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> MarketResult<Option<AuctionWithListing>> {
    info!("{:<12} --> get auction id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let row = sqlx::query_as::<_, AuctionWithListing>(queries::GET_AUCTION)
                    .bind(auction_id)
                    .fetch_optional(&mut **tx)
                    .await?;
                Ok(row)
            })
        })
        .await
}

/// Bid history for one auction, leading bid first.
pub async fn get_bid_history(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> MarketResult<Vec<BidHistoryEntry>> {
    info!("{:<12} --> bid history id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, BidHistoryEntry>(queries::GET_BID_HISTORY)
                    .bind(auction_id)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(rows)
            })
        })
        .await
}

/// Current leading amount for one auction.
pub async fn get_highest_bid(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> MarketResult<Option<i64>> {
    info!("{:<12} --> highest bid id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let highest = sqlx::query_scalar::<_, Option<i64>>(queries::GET_HIGHEST_BID)
                    .bind(auction_id)
                    .fetch_one(&mut **tx)
                    .await?;
                Ok(highest)
            })
        })
        .await
}

/// Marketplace browse with an optional category filter.
pub async fn list_listings(
    db_manager: &DatabaseManager,
    status: String,
    category: Option<String>,
) -> MarketResult<Vec<Listing>> {
    info!(
        "{:<12} --> browse listings status: {} category: {:?}",
        "Query", status, category
    );
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = match category {
                    Some(category) => {
                        sqlx::query_as::<_, Listing>(queries::LIST_LISTINGS_BY_CATEGORY)
                            .bind(status)
                            .bind(category)
                            .fetch_all(&mut **tx)
                            .await?
                    }
                    None => {
                        sqlx::query_as::<_, Listing>(queries::LIST_LISTINGS)
                            .bind(status)
                            .fetch_all(&mut **tx)
                            .await?
                    }
                };
                Ok(rows)
            })
        })
        .await
}

/// Upcoming events, soonest first.
pub async fn list_upcoming_events(db_manager: &DatabaseManager) -> MarketResult<Vec<Event>> {
    info!("{:<12} --> list upcoming events", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, Event>(queries::LIST_UPCOMING_EVENTS)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(rows)
            })
        })
        .await
}

/// One event.
pub async fn get_event(
    db_manager: &DatabaseManager,
    event_id: i64,
) -> MarketResult<Option<Event>> {
    info!("{:<12} --> get event id: {}", "Query", event_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let row = sqlx::query_as::<_, Event>(queries::GET_EVENT)
                    .bind(event_id)
                    .fetch_optional(&mut **tx)
                    .await?;
                Ok(row)
            })
        })
        .await
}

/// Attendees of one event, in RSVP order.
pub async fn list_event_attendees(
    db_manager: &DatabaseManager,
    event_id: i64,
) -> MarketResult<Vec<AttendeeEntry>> {
    info!("{:<12} --> list attendees id: {}", "Query", event_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, AttendeeEntry>(queries::LIST_EVENT_ATTENDEES)
                    .bind(event_id)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(rows)
            })
        })
        .await
}

/// Community feed, newest first.
pub async fn list_posts(db_manager: &DatabaseManager) -> MarketResult<Vec<PostEntry>> {
    info!("{:<12} --> list posts", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, PostEntry>(queries::LIST_POSTS)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(rows)
            })
        })
        .await
}

/// Profile row for the dashboard; absent when the identity provider has
/// not pushed a profile yet.
pub async fn get_profile(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> MarketResult<Option<Profile>> {
    info!("{:<12} --> get profile id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let row = sqlx::query_as::<_, Profile>(queries::GET_PROFILE)
                    .bind(user_id)
                    .fetch_optional(&mut **tx)
                    .await?;
                Ok(row)
            })
        })
        .await
}

/// Caller's recent fixed-price listings.
pub async fn my_listings(db_manager: &DatabaseManager, user_id: i64) -> MarketResult<Vec<Listing>> {
    info!("{:<12} --> my listings id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, Listing>(queries::MY_LISTINGS)
                    .bind(user_id)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(rows)
            })
        })
        .await
}

/// Caller's recent auctions.
pub async fn my_auctions(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> MarketResult<Vec<AuctionWithListing>> {
    info!("{:<12} --> my auctions id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, AuctionWithListing>(queries::MY_AUCTIONS)
                    .bind(user_id)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(rows)
            })
        })
        .await
}

/// Caller's organized events.
pub async fn my_events(db_manager: &DatabaseManager, user_id: i64) -> MarketResult<Vec<Event>> {
    info!("{:<12} --> my events id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, Event>(queries::MY_EVENTS)
                    .bind(user_id)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(rows)
            })
        })
        .await
}

/// Caller's RSVPs with their events.
pub async fn my_rsvps(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> MarketResult<Vec<RsvpWithEvent>> {
    info!("{:<12} --> my rsvps id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, RsvpWithEvent>(queries::MY_RSVPS)
                    .bind(user_id)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(rows)
            })
        })
        .await
}

// endregion: --- Query Handlers
