use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};

pub mod commands;

/// Auction lifecycle labels. There is no transition out of `completed`.
pub mod status {
    pub const SCHEDULED: &str = "scheduled";
    pub const ACTIVE: &str = "active";
    pub const COMPLETED: &str = "completed";
}

/// The ledger row for one auction: starting price, leading bid and bidder,
/// thresholds, time window, lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub listing_id: i64,
    pub seller_id: i64,
    pub starting_price: i64,
    pub current_bid: Option<i64>,
    pub highest_bidder_id: Option<i64>,
    pub reserve_price: Option<i64>,
    pub buy_now_price: Option<i64>,
    pub min_bid_increment: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// Minimum acceptable next bid. The first bid may match the starting
    /// price exactly; every later bid must clear the increment.
    pub fn minimum_bid(&self) -> i64 {
        match self.current_bid {
            Some(current) => current + self.min_bid_increment,
            None => self.starting_price,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == status::COMPLETED
    }

    /// Checks the bidding window against server time.
    ///
    /// The stored status label is only trusted for `completed`; the time
    /// bounds decide everything else, so a label the scheduler has not
    /// swept yet never admits a bid it should not.
    pub fn ensure_open(&self, now: DateTime<Utc>) -> MarketResult<()> {
        if self.is_completed() || now > self.end_time {
            return Err(MarketError::AuctionEnded);
        }
        if now < self.start_time {
            return Err(MarketError::AuctionNotStarted);
        }
        Ok(())
    }
}

/// One accepted bid. Rows are append-only, never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub bidder_id: i64,
    pub bid_amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Countdown to `end_time`, for display only. Never mutates status.
pub fn time_remaining(end_time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let distance = end_time - now;
    if distance < chrono::Duration::zero() {
        return "ended".to_string();
    }

    let secs = distance.num_seconds();
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn auction(current_bid: Option<i64>) -> Auction {
        let now = Utc::now();
        Auction {
            id: 1,
            listing_id: 1,
            seller_id: 10,
            starting_price: 5000,
            current_bid,
            highest_bidder_id: current_bid.map(|_| 11),
            reserve_price: None,
            buy_now_price: None,
            min_bid_increment: 500,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            status: status::ACTIVE.to_string(),
            created_at: now,
        }
    }

    #[test]
    fn first_bid_minimum_is_starting_price() {
        assert_eq!(auction(None).minimum_bid(), 5000);
    }

    #[test]
    fn later_bids_must_clear_increment() {
        assert_eq!(auction(Some(5000)).minimum_bid(), 5500);
    }

    #[test]
    fn completed_auction_is_closed_regardless_of_time() {
        let mut a = auction(None);
        a.status = status::COMPLETED.to_string();
        assert!(matches!(
            a.ensure_open(Utc::now()),
            Err(MarketError::AuctionEnded)
        ));
    }

    #[test]
    fn expired_auction_is_closed_even_if_label_is_stale() {
        let mut a = auction(None);
        a.end_time = Utc::now() - Duration::seconds(1);
        assert!(matches!(
            a.ensure_open(Utc::now()),
            Err(MarketError::AuctionEnded)
        ));
    }

    #[test]
    fn scheduled_label_does_not_block_an_open_window() {
        let mut a = auction(None);
        a.status = status::SCHEDULED.to_string();
        assert!(a.ensure_open(Utc::now()).is_ok());
    }

    #[test]
    fn bid_before_start_is_rejected() {
        let mut a = auction(None);
        a.start_time = Utc::now() + Duration::hours(1);
        assert!(matches!(
            a.ensure_open(Utc::now()),
            Err(MarketError::AuctionNotStarted)
        ));
    }

    #[test]
    fn time_remaining_breaks_down_the_distance() {
        let now = Utc::now();
        let end = now + Duration::days(2) + Duration::hours(5) + Duration::minutes(3) + Duration::seconds(10);
        assert_eq!(time_remaining(end, now), "2d 5h 3m 10s");
    }

    #[test]
    fn time_remaining_reports_ended_when_negative() {
        let now = Utc::now();
        assert_eq!(time_remaining(now - Duration::seconds(5), now), "ended");
    }
}
