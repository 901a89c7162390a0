//! Session repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SessionEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        account_id: Uuid,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<SessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_session");
        let result = sqlx::query_as::<_, SessionEntity>(
            r#"
            INSERT INTO sessions (account_id, jti, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, account_id, jti, expires_at, created_at
            "#,
        )
        .bind(account_id)
        .bind(jti)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an unexpired session by token id.
    pub async fn find_active(&self, jti: &str) -> Result<Option<SessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_session");
        let result = sqlx::query_as::<_, SessionEntity>(
            r#"
            SELECT id, account_id, jti, expires_at, created_at
            FROM sessions
            WHERE jti = $1 AND expires_at > NOW()
            "#,
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_by_jti(&self, jti: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_session");
        let result = sqlx::query("DELETE FROM sessions WHERE jti = $1")
            .bind(jti)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }

    /// Drop sessions past their expiry. Returns the number removed.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_sessions");
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}
