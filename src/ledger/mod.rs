//! Auction ledger storage.
//!
//! The ledger row and the bid log always move together: a bid is appended
//! and the leading bid/bidder advanced in one transaction, conditional on
//! the ledger state the caller validated against. A concurrent writer that
//! got there first turns the write into a conflict instead of a silent
//! lost update.

// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::auctions::{status, Auction, Bid};
use crate::error::MarketResult;
// endregion: --- Imports

/// Outcome of a conditional ledger write.
#[derive(Debug)]
pub enum LedgerWrite {
    /// Bid appended and ledger advanced.
    Recorded(Bid),
    /// The observed state moved underneath the caller; re-read and retry.
    Conflict,
}

/// Storage contract for the bidding core.
#[async_trait]
pub trait AuctionLedger: Send + Sync {
    async fn fetch_auction(&self, auction_id: i64) -> MarketResult<Option<Auction>>;

    /// Appends a bid and advances the leading bid/bidder, conditional on
    /// `current_bid` still matching the value in `observed`.
    async fn advance_leader(
        &self,
        observed: &Auction,
        bidder_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<LedgerWrite>;

    /// Appends a bid at the buy-now price and completes the auction in one
    /// transition, conditional on the auction not being completed yet.
    async fn complete_buy_now(
        &self,
        observed: &Auction,
        buyer_id: i64,
        price: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<LedgerWrite>;
}

// region:    --- Postgres Ledger

pub struct PostgresLedger {
    pool: Arc<PgPool>,
}

impl PostgresLedger {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuctionLedger for PostgresLedger {
    async fn fetch_auction(&self, auction_id: i64) -> MarketResult<Option<Auction>> {
        let auction = sqlx::query_as::<_, Auction>("SELECT * FROM auctions WHERE id = $1")
            .bind(auction_id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(auction)
    }

    async fn advance_leader(
        &self,
        observed: &Auction,
        bidder_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<LedgerWrite> {
        let mut tx = self.pool.begin().await?;

        // IS NOT DISTINCT FROM: the very first bid is guarded on NULL.
        let advanced = sqlx::query_scalar::<_, i64>(
            "UPDATE auctions SET current_bid = $1, highest_bidder_id = $2 \
             WHERE id = $3 AND current_bid IS NOT DISTINCT FROM $4 AND status <> 'completed' \
             RETURNING id",
        )
        .bind(amount)
        .bind(bidder_id)
        .bind(observed.id)
        .bind(observed.current_bid)
        .fetch_optional(&mut *tx)
        .await?;

        if advanced.is_none() {
            tx.rollback().await?;
            return Ok(LedgerWrite::Conflict);
        }

        let bid = sqlx::query_as::<_, Bid>(
            "INSERT INTO bids (auction_id, bidder_id, bid_amount, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(observed.id)
        .bind(bidder_id)
        .bind(amount)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(LedgerWrite::Recorded(bid))
    }

    async fn complete_buy_now(
        &self,
        observed: &Auction,
        buyer_id: i64,
        price: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<LedgerWrite> {
        let mut tx = self.pool.begin().await?;

        let completed = sqlx::query_scalar::<_, i64>(
            "UPDATE auctions \
             SET current_bid = $1, highest_bidder_id = $2, status = 'completed' \
             WHERE id = $3 AND status <> 'completed' \
             RETURNING id",
        )
        .bind(price)
        .bind(buyer_id)
        .bind(observed.id)
        .fetch_optional(&mut *tx)
        .await?;

        if completed.is_none() {
            tx.rollback().await?;
            return Ok(LedgerWrite::Conflict);
        }

        let bid = sqlx::query_as::<_, Bid>(
            "INSERT INTO bids (auction_id, bidder_id, bid_amount, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(observed.id)
        .bind(buyer_id)
        .bind(price)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(LedgerWrite::Recorded(bid))
    }
}

// endregion: --- Postgres Ledger

// region:    --- In-Memory Ledger

/// Fake in-memory ledger with the same conditional-write semantics.
///
/// Useful for unit tests.
#[derive(Default)]
pub struct InMemoryLedger {
    inner: Mutex<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    auctions: HashMap<i64, Auction>,
    bids: Vec<Bid>,
    next_bid_id: i64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_auction(&self, auction: Auction) {
        let mut state = self.inner.lock().expect("lock");
        state.auctions.insert(auction.id, auction);
    }

    pub fn auction(&self, auction_id: i64) -> Option<Auction> {
        self.inner
            .lock()
            .expect("lock")
            .auctions
            .get(&auction_id)
            .cloned()
    }

    pub fn bids_for(&self, auction_id: i64) -> Vec<Bid> {
        self.inner
            .lock()
            .expect("lock")
            .bids
            .iter()
            .filter(|b| b.auction_id == auction_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuctionLedger for InMemoryLedger {
    async fn fetch_auction(&self, auction_id: i64) -> MarketResult<Option<Auction>> {
        Ok(self.auction(auction_id))
    }

    async fn advance_leader(
        &self,
        observed: &Auction,
        bidder_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<LedgerWrite> {
        let mut state = self.inner.lock().expect("lock");
        let state = &mut *state;

        let Some(auction) = state.auctions.get_mut(&observed.id) else {
            return Ok(LedgerWrite::Conflict);
        };
        if auction.status == status::COMPLETED || auction.current_bid != observed.current_bid {
            return Ok(LedgerWrite::Conflict);
        }

        auction.current_bid = Some(amount);
        auction.highest_bidder_id = Some(bidder_id);

        state.next_bid_id += 1;
        let bid = Bid {
            id: state.next_bid_id,
            auction_id: observed.id,
            bidder_id,
            bid_amount: amount,
            created_at: now,
        };
        state.bids.push(bid.clone());
        Ok(LedgerWrite::Recorded(bid))
    }

    async fn complete_buy_now(
        &self,
        observed: &Auction,
        buyer_id: i64,
        price: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<LedgerWrite> {
        let mut state = self.inner.lock().expect("lock");
        let state = &mut *state;

        let Some(auction) = state.auctions.get_mut(&observed.id) else {
            return Ok(LedgerWrite::Conflict);
        };
        if auction.status == status::COMPLETED {
            return Ok(LedgerWrite::Conflict);
        }

        auction.current_bid = Some(price);
        auction.highest_bidder_id = Some(buyer_id);
        auction.status = status::COMPLETED.to_string();

        state.next_bid_id += 1;
        let bid = Bid {
            id: state.next_bid_id,
            auction_id: observed.id,
            bidder_id: buyer_id,
            bid_amount: price,
            created_at: now,
        };
        state.bids.push(bid.clone());
        Ok(LedgerWrite::Recorded(bid))
    }
}

// endregion: --- In-Memory Ledger
