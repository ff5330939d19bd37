/// Bid handling commands
/// 1. place bid
/// 2. buy now
// region:    --- Imports
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auctions::Bid;
use crate::error::{MarketError, MarketResult};
use crate::ledger::{AuctionLedger, LedgerWrite};
// endregion: --- Imports

// region:    --- Commands

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub bid_amount: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BuyNowCommand {
    pub auction_id: i64,
}

// Bound on optimistic-concurrency retries
const MAX_RETRIES: u32 = 100;

/// 1. Place a bid.
///
/// Read the ledger, validate against it, then write conditionally on the
/// exact state that was validated. A concurrent bidder landing first turns
/// the write into a conflict; the loop re-reads and re-validates, so the
/// minimum is always recomputed against what actually happened.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    bidder_id: i64,
    ledger: &impl AuctionLedger,
) -> MarketResult<Bid> {
    info!(
        "{:<12} --> bid request from bidder {}: {:?}",
        "Command", bidder_id, cmd
    );

    if cmd.bid_amount <= 0 {
        return Err(MarketError::Validation(
            "bid amount must be positive".to_string(),
        ));
    }

    let mut retries = 0;
    while retries < MAX_RETRIES {
        let auction = ledger
            .fetch_auction(cmd.auction_id)
            .await?
            .ok_or(MarketError::NotFound("auction"))?;

        let now = Utc::now();
        auction.ensure_open(now)?;

        if auction.seller_id == bidder_id {
            return Err(MarketError::SelfBid);
        }

        let minimum = auction.minimum_bid();
        if cmd.bid_amount < minimum {
            return Err(MarketError::BidTooLow { minimum });
        }

        match ledger
            .advance_leader(&auction, bidder_id, cmd.bid_amount, now)
            .await?
        {
            LedgerWrite::Recorded(bid) => {
                info!(
                    "{:<12} --> bid accepted: auction {} now leads at {}",
                    "Command", cmd.auction_id, cmd.bid_amount
                );
                return Ok(bid);
            }
            LedgerWrite::Conflict => {
                warn!(
                    "{:<12} --> ledger moved during optimistic update, retrying",
                    "Command"
                );
                retries += 1;
            }
        }
    }

    Err(MarketError::Contention)
}

/// 2. Buy now.
///
/// Short-circuits the auction: one transition appends the final bid at the
/// buy-now price, promotes the buyer to highest bidder and completes the
/// auction regardless of its end time.
pub async fn handle_buy_now(
    cmd: BuyNowCommand,
    buyer_id: i64,
    ledger: &impl AuctionLedger,
) -> MarketResult<Bid> {
    info!(
        "{:<12} --> buy now request from buyer {}: {:?}",
        "Command", buyer_id, cmd
    );

    let mut retries = 0;
    while retries < MAX_RETRIES {
        let auction = ledger
            .fetch_auction(cmd.auction_id)
            .await?
            .ok_or(MarketError::NotFound("auction"))?;

        let now = Utc::now();
        auction.ensure_open(now)?;

        if auction.seller_id == buyer_id {
            return Err(MarketError::SelfPurchase);
        }

        let Some(price) = auction.buy_now_price else {
            return Err(MarketError::NoBuyNowPrice);
        };

        match ledger
            .complete_buy_now(&auction, buyer_id, price, now)
            .await?
        {
            LedgerWrite::Recorded(bid) => {
                info!(
                    "{:<12} --> buy now executed: auction {} completed at {}",
                    "Command", cmd.auction_id, price
                );
                return Ok(bid);
            }
            LedgerWrite::Conflict => {
                retries += 1;
            }
        }
    }

    Err(MarketError::Contention)
}

// endregion: --- Commands
