//! Comment entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct CommentEntity {
    pub id: Uuid,
    pub wish_id: Uuid,
    pub author_id: Option<Uuid>,
    pub display_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentEntity> for domain::models::Comment {
    fn from(entity: CommentEntity) -> Self {
        Self {
            id: entity.id,
            wish_id: entity.wish_id,
            author_id: entity.author_id,
            display_name: entity.display_name,
            message: entity.message,
            created_at: entity.created_at,
        }
    }
}
