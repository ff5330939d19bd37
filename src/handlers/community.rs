// region:    --- Imports
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::auth::Identity;
use crate::community::{handle_create_post, CreatePostCommand};
use crate::error::MarketResult;
use crate::handlers::AppState;
use crate::query;
// endregion: --- Imports

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    identity: Identity,
    Json(cmd): Json<CreatePostCommand>,
) -> MarketResult<impl IntoResponse> {
    let post = handle_create_post(cmd, identity.user_id(), &state.db).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts
pub async fn list_posts(State(state): State<AppState>) -> MarketResult<impl IntoResponse> {
    let posts = query::handlers::list_posts(&state.db).await?;
    Ok(Json(posts))
}
