// region:    --- Imports
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::auth::Identity;
use crate::error::{MarketError, MarketResult};
use crate::events::commands::{
    handle_cancel_rsvp, handle_create_event, handle_delete_event, handle_join_event,
    CreateEventCommand,
};
use crate::events::Event;
use crate::handlers::AppState;
use crate::query;
// endregion: --- Imports

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    identity: Identity,
    Json(cmd): Json<CreateEventCommand>,
) -> MarketResult<impl IntoResponse> {
    let event = handle_create_event(cmd, identity.user_id(), &state.db).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events
pub async fn list_events(State(state): State<AppState>) -> MarketResult<Json<Vec<Event>>> {
    let events = query::handlers::list_upcoming_events(&state.db).await?;
    Ok(Json(events))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> MarketResult<Json<Event>> {
    let event = query::handlers::get_event(&state.db, event_id)
        .await?
        .ok_or(MarketError::NotFound("event"))?;
    Ok(Json(event))
}

/// GET /events/:id/attendees
pub async fn list_attendees(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> MarketResult<impl IntoResponse> {
    query::handlers::get_event(&state.db, event_id)
        .await?
        .ok_or(MarketError::NotFound("event"))?;
    let attendees = query::handlers::list_event_attendees(&state.db, event_id).await?;
    Ok(Json(attendees))
}

/// POST /events/:id/rsvp
pub async fn join_event(
    State(state): State<AppState>,
    identity: Identity,
    Path(event_id): Path<i64>,
) -> MarketResult<impl IntoResponse> {
    let attendee = handle_join_event(event_id, identity.user_id(), state.rsvp.as_ref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "RSVP confirmed, see you at the event",
            "attendee": attendee,
        })),
    ))
}

/// DELETE /events/:id/rsvp
pub async fn cancel_rsvp(
    State(state): State<AppState>,
    identity: Identity,
    Path(event_id): Path<i64>,
) -> MarketResult<impl IntoResponse> {
    handle_cancel_rsvp(event_id, identity.user_id(), state.rsvp.as_ref()).await?;
    Ok(Json(json!({ "message": "RSVP cancelled" })))
}

/// DELETE /events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    identity: Identity,
    Path(event_id): Path<i64>,
) -> MarketResult<impl IntoResponse> {
    handle_delete_event(event_id, identity.user_id(), &state.db).await?;
    Ok(Json(json!({ "message": "event deleted" })))
}
