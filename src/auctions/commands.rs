/// Auction creation.
///
/// An auction wraps an existing listing owned by the seller; the listing
/// itself is created separately through the listings module.
// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auctions::{status, Auction};
use crate::database::DatabaseManager;
use crate::error::{MarketError, MarketResult};
// endregion: --- Imports

pub const DEFAULT_BID_INCREMENT: i64 = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateAuctionCommand {
    pub listing_id: i64,
    pub starting_price: i64,
    pub reserve_price: Option<i64>,
    pub buy_now_price: Option<i64>,
    pub min_bid_increment: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl CreateAuctionCommand {
    /// Validates the thresholds and the time window; returns the effective
    /// bid increment.
    pub fn validate(&self) -> MarketResult<i64> {
        if self.starting_price <= 0 {
            return Err(MarketError::Validation(
                "starting price must be positive".to_string(),
            ));
        }
        if self.start_time >= self.end_time {
            return Err(MarketError::Validation(
                "start time must be before end time".to_string(),
            ));
        }
        let increment = self.min_bid_increment.unwrap_or(DEFAULT_BID_INCREMENT);
        if increment <= 0 {
            return Err(MarketError::Validation(
                "minimum bid increment must be positive".to_string(),
            ));
        }
        if let Some(reserve) = self.reserve_price {
            if reserve <= self.starting_price {
                return Err(MarketError::Validation(
                    "reserve price must exceed the starting price".to_string(),
                ));
            }
        }
        if let Some(buy_now) = self.buy_now_price {
            if buy_now <= self.starting_price {
                return Err(MarketError::Validation(
                    "buy now price must exceed the starting price".to_string(),
                ));
            }
        }
        Ok(increment)
    }
}

/// Creates the auction row for a listing the seller owns. Status is
/// `active` when the window is already open, `scheduled` otherwise; the
/// scheduler takes over label transitions from there.
pub async fn handle_create_auction(
    cmd: CreateAuctionCommand,
    seller_id: i64,
    db_manager: &DatabaseManager,
) -> MarketResult<Auction> {
    info!("{:<12} --> create auction request: {:?}", "Command", cmd);

    let increment = cmd.validate()?;
    let now = Utc::now();
    let initial_status = if cmd.start_time <= now {
        status::ACTIVE
    } else {
        status::SCHEDULED
    };

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let owner: Option<i64> =
                    sqlx::query_scalar("SELECT user_id FROM listings WHERE id = $1")
                        .bind(cmd.listing_id)
                        .fetch_optional(&mut **tx)
                        .await?;

                match owner {
                    None => Err(MarketError::NotFound("listing")),
                    Some(user_id) if user_id != seller_id => Err(MarketError::Validation(
                        "listing does not belong to the seller".to_string(),
                    )),
                    Some(_) => {
                        let auction = sqlx::query_as::<_, Auction>(
                            "INSERT INTO auctions \
                             (listing_id, seller_id, starting_price, reserve_price, \
                              buy_now_price, min_bid_increment, start_time, end_time, status) \
                             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                             RETURNING *",
                        )
                        .bind(cmd.listing_id)
                        .bind(seller_id)
                        .bind(cmd.starting_price)
                        .bind(cmd.reserve_price)
                        .bind(cmd.buy_now_price)
                        .bind(increment)
                        .bind(cmd.start_time)
                        .bind(cmd.end_time)
                        .bind(initial_status)
                        .fetch_one(&mut **tx)
                        .await?;
                        Ok(auction)
                    }
                }
            })
        })
        .await
}

/// Deletes an auction the caller owns, together with its bid log. Rows
/// owned by someone else are indistinguishable from absent ones.
pub async fn handle_delete_auction(
    auction_id: i64,
    seller_id: i64,
    db_manager: &DatabaseManager,
) -> MarketResult<()> {
    info!("{:<12} --> delete auction request: {}", "Command", auction_id);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query(
                    "DELETE FROM bids WHERE auction_id = $1 \
                     AND EXISTS (SELECT 1 FROM auctions WHERE id = $1 AND seller_id = $2)",
                )
                .bind(auction_id)
                .bind(seller_id)
                .execute(&mut **tx)
                .await?;

                let deleted = sqlx::query_scalar::<_, i64>(
                    "DELETE FROM auctions WHERE id = $1 AND seller_id = $2 RETURNING id",
                )
                .bind(auction_id)
                .bind(seller_id)
                .fetch_optional(&mut **tx)
                .await?;

                match deleted {
                    Some(_) => Ok(()),
                    None => Err(MarketError::NotFound("auction")),
                }
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn command() -> CreateAuctionCommand {
        let now = Utc::now();
        CreateAuctionCommand {
            listing_id: 1,
            starting_price: 5000,
            reserve_price: None,
            buy_now_price: None,
            min_bid_increment: None,
            start_time: now,
            end_time: now + Duration::days(3),
        }
    }

    #[test]
    fn default_increment_applies() {
        assert_eq!(command().validate().unwrap(), DEFAULT_BID_INCREMENT);
    }

    #[test]
    fn rejects_inverted_window() {
        let mut cmd = command();
        cmd.end_time = cmd.start_time - Duration::hours(1);
        assert!(matches!(cmd.validate(), Err(MarketError::Validation(_))));
    }

    #[test]
    fn rejects_reserve_below_starting_price() {
        let mut cmd = command();
        cmd.reserve_price = Some(4000);
        assert!(matches!(cmd.validate(), Err(MarketError::Validation(_))));
    }

    #[test]
    fn rejects_buy_now_below_starting_price() {
        let mut cmd = command();
        cmd.buy_now_price = Some(5000);
        assert!(matches!(cmd.validate(), Err(MarketError::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_starting_price() {
        let mut cmd = command();
        cmd.starting_price = 0;
        assert!(matches!(cmd.validate(), Err(MarketError::Validation(_))));
    }
}
