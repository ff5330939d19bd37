//! RSVP storage.
//!
//! Same shape as the auction ledger, lower stakes: the attendee row and
//! the counter move together in one transaction, and the counter update is
//! conditional on remaining capacity so two racing joins cannot both slip
//! past a full event.

// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::MarketResult;
use crate::events::{Event, EventAttendee};
// endregion: --- Imports

/// Outcome of a conditional join.
#[derive(Debug)]
pub enum RsvpWrite {
    Joined(EventAttendee),
    Full,
    AlreadyAttending,
}

/// Outcome of a cancellation.
#[derive(Debug)]
pub enum CancelWrite {
    Cancelled,
    NotAttending,
}

#[async_trait]
pub trait RsvpStore: Send + Sync {
    async fn fetch_event(&self, event_id: i64) -> MarketResult<Option<Event>>;

    /// Inserts the attendee row and increments the counter, conditional on
    /// `attendee_count < capacity`.
    async fn join(
        &self,
        event_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<RsvpWrite>;

    /// Removes the attendee row and decrements the counter by exactly one.
    async fn cancel(&self, event_id: i64, user_id: i64) -> MarketResult<CancelWrite>;
}

// region:    --- Postgres Store

pub struct PostgresRsvpStore {
    pool: Arc<PgPool>,
}

impl PostgresRsvpStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RsvpStore for PostgresRsvpStore {
    async fn fetch_event(&self, event_id: i64) -> MarketResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(event)
    }

    async fn join(
        &self,
        event_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<RsvpWrite> {
        let mut tx = self.pool.begin().await?;

        // Counter first: the row lock serializes racing joins and the
        // capacity guard admits at most `capacity` of them.
        let bumped = sqlx::query_scalar::<_, i64>(
            "UPDATE events SET attendee_count = attendee_count + 1 \
             WHERE id = $1 AND attendee_count < capacity \
             RETURNING id",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

        if bumped.is_none() {
            tx.rollback().await?;
            return Ok(RsvpWrite::Full);
        }

        let attendee = sqlx::query_as::<_, EventAttendee>(
            "INSERT INTO event_attendees (event_id, user_id, attended, created_at) \
             VALUES ($1, $2, FALSE, $3) \
             ON CONFLICT (event_id, user_id) DO NOTHING \
             RETURNING *",
        )
        .bind(event_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        match attendee {
            Some(attendee) => {
                tx.commit().await?;
                Ok(RsvpWrite::Joined(attendee))
            }
            None => {
                // Duplicate RSVP; rolling back also restores the counter.
                tx.rollback().await?;
                Ok(RsvpWrite::AlreadyAttending)
            }
        }
    }

    async fn cancel(&self, event_id: i64, user_id: i64) -> MarketResult<CancelWrite> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query_scalar::<_, i64>(
            "DELETE FROM event_attendees WHERE event_id = $1 AND user_id = $2 RETURNING id",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if removed.is_none() {
            tx.rollback().await?;
            return Ok(CancelWrite::NotAttending);
        }

        sqlx::query("UPDATE events SET attendee_count = attendee_count - 1 WHERE id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CancelWrite::Cancelled)
    }
}

// endregion: --- Postgres Store

// region:    --- In-Memory Store

/// Fake in-memory RSVP store. Useful for unit tests.
#[derive(Default)]
pub struct InMemoryRsvpStore {
    inner: Mutex<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    events: HashMap<i64, Event>,
    attendees: Vec<EventAttendee>,
    next_attendee_id: i64,
}

impl InMemoryRsvpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_event(&self, event: Event) {
        let mut state = self.inner.lock().expect("lock");
        state.events.insert(event.id, event);
    }

    pub fn event(&self, event_id: i64) -> Option<Event> {
        self.inner
            .lock()
            .expect("lock")
            .events
            .get(&event_id)
            .cloned()
    }

    pub fn attendees_for(&self, event_id: i64) -> Vec<EventAttendee> {
        self.inner
            .lock()
            .expect("lock")
            .attendees
            .iter()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RsvpStore for InMemoryRsvpStore {
    async fn fetch_event(&self, event_id: i64) -> MarketResult<Option<Event>> {
        Ok(self.event(event_id))
    }

    async fn join(
        &self,
        event_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<RsvpWrite> {
        let mut state = self.inner.lock().expect("lock");
        let state = &mut *state;

        if state
            .attendees
            .iter()
            .any(|a| a.event_id == event_id && a.user_id == user_id)
        {
            return Ok(RsvpWrite::AlreadyAttending);
        }

        let Some(event) = state.events.get_mut(&event_id) else {
            return Ok(RsvpWrite::Full);
        };
        if event.attendee_count >= event.capacity {
            return Ok(RsvpWrite::Full);
        }

        event.attendee_count += 1;
        state.next_attendee_id += 1;
        let attendee = EventAttendee {
            id: state.next_attendee_id,
            event_id,
            user_id,
            attended: false,
            created_at: now,
        };
        state.attendees.push(attendee.clone());
        Ok(RsvpWrite::Joined(attendee))
    }

    async fn cancel(&self, event_id: i64, user_id: i64) -> MarketResult<CancelWrite> {
        let mut state = self.inner.lock().expect("lock");
        let state = &mut *state;

        let before = state.attendees.len();
        state
            .attendees
            .retain(|a| !(a.event_id == event_id && a.user_id == user_id));
        if state.attendees.len() == before {
            return Ok(CancelWrite::NotAttending);
        }

        if let Some(event) = state.events.get_mut(&event_id) {
            event.attendee_count -= 1;
        }
        Ok(CancelWrite::Cancelled)
    }
}

// endregion: --- In-Memory Store
