// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::DatabaseManager;
use crate::error::{MarketError, MarketResult};
// endregion: --- Imports

/// A fixed-price (or auction-backed) listing. Image URLs point into the
/// external object store; uploads never pass through this service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub price: i64,
    pub image_urls: Vec<String>,
    pub is_auction: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateListingCommand {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub is_auction: bool,
}

impl CreateListingCommand {
    pub fn validate(&self) -> MarketResult<()> {
        if self.title.trim().is_empty() {
            return Err(MarketError::Validation("title is required".to_string()));
        }
        if self.price <= 0 {
            return Err(MarketError::Validation(
                "price must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub async fn handle_create_listing(
    cmd: CreateListingCommand,
    user_id: i64,
    db_manager: &DatabaseManager,
) -> MarketResult<Listing> {
    info!("{:<12} --> create listing request: {:?}", "Command", cmd);

    cmd.validate()?;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let listing = sqlx::query_as::<_, Listing>(
                    "INSERT INTO listings \
                     (user_id, title, description, category, condition, price, \
                      image_urls, is_auction, status) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active') \
                     RETURNING *",
                )
                .bind(user_id)
                .bind(&cmd.title)
                .bind(&cmd.description)
                .bind(&cmd.category)
                .bind(&cmd.condition)
                .bind(cmd.price)
                .bind(&cmd.image_urls)
                .bind(cmd.is_auction)
                .fetch_one(&mut **tx)
                .await?;
                Ok(listing)
            })
        })
        .await
}

/// Deletes a listing the caller owns. Listings wrapped by an auction are
/// removed through the auction instead.
pub async fn handle_delete_listing(
    listing_id: i64,
    user_id: i64,
    db_manager: &DatabaseManager,
) -> MarketResult<()> {
    info!("{:<12} --> delete listing request: {}", "Command", listing_id);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let deleted = sqlx::query_scalar::<_, i64>(
                    "DELETE FROM listings WHERE id = $1 AND user_id = $2 \
                     AND NOT EXISTS (SELECT 1 FROM auctions WHERE listing_id = $1) \
                     RETURNING id",
                )
                .bind(listing_id)
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;

                match deleted {
                    Some(_) => Ok(()),
                    None => Err(MarketError::NotFound("listing")),
                }
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> CreateListingCommand {
        CreateListingCommand {
            title: "Vintage lamp".to_string(),
            description: "Works fine".to_string(),
            category: Some("home".to_string()),
            condition: Some("good".to_string()),
            price: 2500,
            image_urls: vec![],
            is_auction: false,
        }
    }

    #[test]
    fn accepts_a_plain_listing() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn rejects_blank_title() {
        let mut cmd = command();
        cmd.title = String::new();
        assert!(matches!(cmd.validate(), Err(MarketError::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_price() {
        let mut cmd = command();
        cmd.price = 0;
        assert!(matches!(cmd.validate(), Err(MarketError::Validation(_))));
    }
}
