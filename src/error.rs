// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;
// endregion: --- Imports

/// Formats integer cents as a dollar amount for user-facing messages.
pub fn format_amount(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, (cents % 100).abs())
}

/// Everything a request can fail with.
///
/// Validation and not-found errors carry messages specific enough to show
/// to the user; database failures are logged and surfaced generically.
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("authentication required")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("this auction has already ended")]
    AuctionEnded,
    #[error("this auction has not started yet")]
    AuctionNotStarted,
    #[error("you cannot bid on your own auction")]
    SelfBid,
    #[error("you cannot buy your own auction")]
    SelfPurchase,
    #[error("bid must be at least {}", format_amount(*.minimum))]
    BidTooLow { minimum: i64 },
    #[error("this auction has no buy now price")]
    NoBuyNowPrice,
    #[error("this event is at full capacity")]
    EventFull,
    #[error("you are already attending this event")]
    AlreadyAttending,
    #[error("you are not attending this event")]
    NotAttending,
    #[error("{0}")]
    Validation(String),
    #[error("too many concurrent updates, please try again")]
    Contention,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type MarketResult<T> = Result<T, MarketError>;

impl MarketError {
    /// Stable machine-readable code carried alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::Unauthorized => "UNAUTHORIZED",
            MarketError::NotFound(_) => "NOT_FOUND",
            MarketError::AuctionEnded => "ALREADY_ENDED",
            MarketError::AuctionNotStarted => "NOT_STARTED",
            MarketError::SelfBid => "SELF_BID",
            MarketError::SelfPurchase => "SELF_BUY",
            MarketError::BidTooLow { .. } => "LOW_BID",
            MarketError::NoBuyNowPrice => "NO_BUY_NOW",
            MarketError::EventFull => "EVENT_FULL",
            MarketError::AlreadyAttending => "ALREADY_ATTENDING",
            MarketError::NotAttending => "NOT_ATTENDING",
            MarketError::Validation(_) => "VALIDATION",
            MarketError::Contention => "MAX_RETRIES_EXCEEDED",
            MarketError::Database(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            MarketError::Unauthorized => StatusCode::UNAUTHORIZED,
            MarketError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketError::Contention => StatusCode::CONFLICT,
            MarketError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Upstream failures are not the caller's fault; keep details in the log.
            MarketError::Database(e) => {
                error!("{:<12} --> database failure: {:?}", "Error", e);
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (self.status(), body).into_response()
    }
}
