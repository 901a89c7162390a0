//! Comment repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::NewComment;

use crate::entities::CommentEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, comment: &NewComment) -> Result<CommentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_comment");
        let result = sqlx::query_as::<_, CommentEntity>(
            r#"
            INSERT INTO comments (wish_id, author_id, display_name, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, wish_id, author_id, display_name, message, created_at
            "#,
        )
        .bind(comment.wish_id)
        .bind(comment.author_id)
        .bind(&comment.display_name)
        .bind(&comment.message)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Comments for a wish, newest first.
    pub async fn list_by_wish(
        &self,
        wish_id: Uuid,
        limit: i64,
    ) -> Result<Vec<CommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_comments_by_wish");
        let result = sqlx::query_as::<_, CommentEntity>(
            r#"
            SELECT id, wish_id, author_id, display_name, message, created_at
            FROM comments
            WHERE wish_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(wish_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
