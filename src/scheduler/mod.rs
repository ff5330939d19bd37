/// Status sweeper.
///
/// Flips auction and event lifecycle labels as their time windows pass.
/// The bidding commands do not depend on the sweep: they check the time
/// window against server time themselves, so a label the sweeper has not
/// reached yet cannot admit a late bid.
// region:    --- Imports
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error};
// endregion: --- Imports

// region:    --- Status Scheduler

pub struct StatusScheduler {
    pool: Arc<PgPool>,
}

impl StatusScheduler {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Starts the sweep loop.
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                if let Err(e) = Self::update_statuses(&pool).await {
                    error!("{:<12} --> status sweep failed: {:?}", "Scheduler", e);
                }
            }
        });
    }

    async fn update_statuses(pool: &PgPool) -> Result<(), sqlx::Error> {
        let now = Utc::now();

        // scheduled -> active
        sqlx::query(
            "UPDATE auctions SET status = 'active' \
             WHERE status = 'scheduled' AND start_time <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;

        // active -> completed
        sqlx::query(
            "UPDATE auctions SET status = 'completed' \
             WHERE status = 'active' AND end_time <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;

        // upcoming -> completed
        sqlx::query(
            "UPDATE events SET status = 'completed' \
             WHERE status = 'upcoming' AND event_date <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;

        debug!("{:<12} --> status sweep complete", "Scheduler");

        Ok(())
    }
}

// endregion: --- Status Scheduler
