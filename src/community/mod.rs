// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::DatabaseManager;
use crate::error::{MarketError, MarketResult};
// endregion: --- Imports

/// A discussion post on the community feed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommunityPost {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub likes_count: i32,
    pub replies_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreatePostCommand {
    pub title: String,
    pub content: String,
}

impl CreatePostCommand {
    pub fn validate(&self) -> MarketResult<()> {
        if self.title.trim().is_empty() {
            return Err(MarketError::Validation("title is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(MarketError::Validation("content is required".to_string()));
        }
        Ok(())
    }
}

pub async fn handle_create_post(
    cmd: CreatePostCommand,
    user_id: i64,
    db_manager: &DatabaseManager,
) -> MarketResult<CommunityPost> {
    info!("{:<12} --> create post request: {:?}", "Command", cmd);

    cmd.validate()?;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let post = sqlx::query_as::<_, CommunityPost>(
                    "INSERT INTO community_posts (user_id, title, content, likes_count, replies_count) \
                     VALUES ($1, $2, $3, 0, 0) \
                     RETURNING *",
                )
                .bind(user_id)
                .bind(&cmd.title)
                .bind(&cmd.content)
                .fetch_one(&mut **tx)
                .await?;
                Ok(post)
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_content() {
        let cmd = CreatePostCommand {
            title: "Meetup recap".to_string(),
            content: " ".to_string(),
        };
        assert!(matches!(cmd.validate(), Err(MarketError::Validation(_))));
    }
}
