// region:    --- Imports
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use crate::database::DatabaseManager;
use crate::events::PostgresRsvpStore;
use crate::ledger::PostgresLedger;
// endregion: --- Imports

pub mod auctions;
pub mod community;
pub mod dashboard;
pub mod events;
pub mod listings;

/// Shared handler state: the pool plus the store implementations the core
/// commands run against.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub ledger: Arc<PostgresLedger>,
    pub rsvp: Arc<PostgresRsvpStore>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        let pool = db.get_pool();
        Self {
            db,
            ledger: Arc::new(PostgresLedger::new(Arc::clone(&pool))),
            rsvp: Arc::new(PostgresRsvpStore::new(pool)),
        }
    }
}

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
