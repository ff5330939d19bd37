use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::MarketError;

/// Header carrying the caller's user id, set by the upstream identity
/// provider after it has authenticated the session.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
///
/// Identity is resolved once per request at the transport layer and passed
/// into every mutating operation as an explicit value; the core never
/// consults ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub i64);

impl Identity {
    pub fn user_id(&self) -> i64 {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .map(Identity)
            .ok_or(MarketError::Unauthorized)
    }
}
