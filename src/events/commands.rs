/// Event commands
/// 1. create event
/// 2. join (RSVP)
/// 3. cancel RSVP
// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::DatabaseManager;
use crate::error::{MarketError, MarketResult};
use crate::events::{status, CancelWrite, Event, EventAttendee, RsvpStore, RsvpWrite};
// endregion: --- Imports

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateEventCommand {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub event_date: DateTime<Utc>,
    pub capacity: i32,
}

impl CreateEventCommand {
    pub fn validate(&self) -> MarketResult<()> {
        if self.title.trim().is_empty() {
            return Err(MarketError::Validation("title is required".to_string()));
        }
        if self.location.trim().is_empty() {
            return Err(MarketError::Validation("location is required".to_string()));
        }
        if self.capacity <= 0 {
            return Err(MarketError::Validation(
                "capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// 1. Create an event. Starts `upcoming` with an empty attendee counter.
pub async fn handle_create_event(
    cmd: CreateEventCommand,
    organizer_id: i64,
    db_manager: &DatabaseManager,
) -> MarketResult<Event> {
    info!("{:<12} --> create event request: {:?}", "Command", cmd);

    cmd.validate()?;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let event = sqlx::query_as::<_, Event>(
                    "INSERT INTO events \
                     (organizer_id, title, description, location, latitude, longitude, \
                      event_date, capacity, attendee_count, status) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9) \
                     RETURNING *",
                )
                .bind(organizer_id)
                .bind(&cmd.title)
                .bind(&cmd.description)
                .bind(&cmd.location)
                .bind(cmd.latitude)
                .bind(cmd.longitude)
                .bind(cmd.event_date)
                .bind(cmd.capacity)
                .bind(status::UPCOMING)
                .fetch_one(&mut **tx)
                .await?;
                Ok(event)
            })
        })
        .await
}

/// 2. RSVP to an event. The capacity check rides on the conditional
/// counter update, so the full-event gate holds under racing joins.
pub async fn handle_join_event(
    event_id: i64,
    user_id: i64,
    store: &impl RsvpStore,
) -> MarketResult<EventAttendee> {
    info!(
        "{:<12} --> rsvp request: event {} user {}",
        "Command", event_id, user_id
    );

    let event = store
        .fetch_event(event_id)
        .await?
        .ok_or(MarketError::NotFound("event"))?;
    if event.is_full() {
        return Err(MarketError::EventFull);
    }

    match store.join(event_id, user_id, Utc::now()).await? {
        RsvpWrite::Joined(attendee) => Ok(attendee),
        RsvpWrite::Full => Err(MarketError::EventFull),
        RsvpWrite::AlreadyAttending => Err(MarketError::AlreadyAttending),
    }
}

/// 3. Cancel an RSVP. Removes exactly one attendee row and decrements the
/// counter by exactly one.
pub async fn handle_cancel_rsvp(
    event_id: i64,
    user_id: i64,
    store: &impl RsvpStore,
) -> MarketResult<()> {
    info!(
        "{:<12} --> cancel rsvp request: event {} user {}",
        "Command", event_id, user_id
    );

    store
        .fetch_event(event_id)
        .await?
        .ok_or(MarketError::NotFound("event"))?;

    match store.cancel(event_id, user_id).await? {
        CancelWrite::Cancelled => Ok(()),
        CancelWrite::NotAttending => Err(MarketError::NotAttending),
    }
}

/// Deletes an event the caller organizes, together with its RSVPs.
pub async fn handle_delete_event(
    event_id: i64,
    organizer_id: i64,
    db_manager: &DatabaseManager,
) -> MarketResult<()> {
    info!("{:<12} --> delete event request: {}", "Command", event_id);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query(
                    "DELETE FROM event_attendees WHERE event_id = $1 \
                     AND EXISTS (SELECT 1 FROM events WHERE id = $1 AND organizer_id = $2)",
                )
                .bind(event_id)
                .bind(organizer_id)
                .execute(&mut **tx)
                .await?;

                let deleted = sqlx::query_scalar::<_, i64>(
                    "DELETE FROM events WHERE id = $1 AND organizer_id = $2 RETURNING id",
                )
                .bind(event_id)
                .bind(organizer_id)
                .fetch_optional(&mut **tx)
                .await?;

                match deleted {
                    Some(_) => Ok(()),
                    None => Err(MarketError::NotFound("event")),
                }
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn command() -> CreateEventCommand {
        CreateEventCommand {
            title: "Swap meet".to_string(),
            description: String::new(),
            location: "Community hall".to_string(),
            latitude: None,
            longitude: None,
            event_date: Utc::now() + Duration::days(7),
            capacity: 30,
        }
    }

    #[test]
    fn accepts_a_plain_event() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn rejects_blank_title() {
        let mut cmd = command();
        cmd.title = "  ".to_string();
        assert!(matches!(cmd.validate(), Err(MarketError::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_capacity() {
        let mut cmd = command();
        cmd.capacity = 0;
        assert!(matches!(cmd.validate(), Err(MarketError::Validation(_))));
    }
}
