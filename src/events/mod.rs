use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod commands;
pub mod store;

pub use store::{CancelWrite, InMemoryRsvpStore, PostgresRsvpStore, RsvpStore, RsvpWrite};

/// Event lifecycle labels.
pub mod status {
    pub const UPCOMING: &str = "upcoming";
    pub const COMPLETED: &str = "completed";
}

/// A community event with a bounded attendee counter.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub organizer_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub event_date: DateTime<Utc>,
    pub capacity: i32,
    pub attendee_count: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.attendee_count >= self.capacity
    }
}

/// One RSVP row, unique per (event, user).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventAttendee {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub attended: bool,
    pub created_at: DateTime<Utc>,
}
