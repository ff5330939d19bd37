use chrono::{Duration, Utc};
use std::sync::Arc;

use thriftup_service::error::MarketError;
use thriftup_service::events::commands::{handle_cancel_rsvp, handle_join_event};
use thriftup_service::events::{status, Event, InMemoryRsvpStore};

const ORGANIZER: i64 = 1;

fn upcoming_event(id: i64, capacity: i32) -> Event {
    let now = Utc::now();
    Event {
        id,
        organizer_id: ORGANIZER,
        title: "Neighborhood swap meet".to_string(),
        description: String::new(),
        location: "Community hall".to_string(),
        latitude: None,
        longitude: None,
        event_date: now + Duration::days(7),
        capacity,
        attendee_count: 0,
        status: status::UPCOMING.to_string(),
        created_at: now,
    }
}

#[tokio::test]
async fn join_inserts_one_row_and_increments_once() {
    let store = InMemoryRsvpStore::new();
    store.insert_event(upcoming_event(1, 10));

    let attendee = handle_join_event(1, 42, &store).await.unwrap();
    assert_eq!(attendee.event_id, 1);
    assert_eq!(attendee.user_id, 42);
    assert!(!attendee.attended);

    assert_eq!(store.event(1).unwrap().attendee_count, 1);
    assert_eq!(store.attendees_for(1).len(), 1);
}

#[tokio::test]
async fn full_event_rejects_joins() {
    let store = InMemoryRsvpStore::new();
    let mut event = upcoming_event(1, 2);
    event.attendee_count = 2;
    store.insert_event(event);

    let err = handle_join_event(1, 42, &store).await.unwrap_err();
    assert!(matches!(err, MarketError::EventFull));
    assert!(store.attendees_for(1).is_empty());
    assert_eq!(store.event(1).unwrap().attendee_count, 2);
}

#[tokio::test]
async fn double_join_is_rejected_without_double_counting() {
    let store = InMemoryRsvpStore::new();
    store.insert_event(upcoming_event(1, 10));

    handle_join_event(1, 42, &store).await.unwrap();
    let err = handle_join_event(1, 42, &store).await.unwrap_err();
    assert!(matches!(err, MarketError::AlreadyAttending));

    assert_eq!(store.event(1).unwrap().attendee_count, 1);
    assert_eq!(store.attendees_for(1).len(), 1);
}

#[tokio::test]
async fn cancel_removes_exactly_one_row_and_decrements_by_one() {
    let store = InMemoryRsvpStore::new();
    store.insert_event(upcoming_event(1, 10));

    handle_join_event(1, 42, &store).await.unwrap();
    handle_join_event(1, 43, &store).await.unwrap();
    assert_eq!(store.event(1).unwrap().attendee_count, 2);

    handle_cancel_rsvp(1, 42, &store).await.unwrap();

    assert_eq!(store.event(1).unwrap().attendee_count, 1);
    let remaining = store.attendees_for(1);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, 43);
}

#[tokio::test]
async fn cancel_without_rsvp_is_rejected() {
    let store = InMemoryRsvpStore::new();
    store.insert_event(upcoming_event(1, 10));

    let err = handle_cancel_rsvp(1, 42, &store).await.unwrap_err();
    assert!(matches!(err, MarketError::NotAttending));
    assert_eq!(store.event(1).unwrap().attendee_count, 0);
}

#[tokio::test]
async fn missing_event_is_not_found() {
    let store = InMemoryRsvpStore::new();

    let err = handle_join_event(7, 42, &store).await.unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)));
    let err = handle_cancel_rsvp(7, 42, &store).await.unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)));
}

/// Racing joins cannot overrun capacity: the conditional counter update
/// admits at most `capacity` of them.
#[tokio::test]
async fn racing_joins_never_overrun_capacity() {
    let store = Arc::new(InMemoryRsvpStore::new());
    store.insert_event(upcoming_event(1, 5));

    let mut handles = vec![];
    for user_id in 0..20_i64 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(
            async move { handle_join_event(1, user_id, store.as_ref()).await },
        ));
    }

    let mut joined = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => joined += 1,
            Err(MarketError::EventFull) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(joined, 5);
    assert_eq!(store.event(1).unwrap().attendee_count, 5);
    assert_eq!(store.attendees_for(1).len(), 5);
}
