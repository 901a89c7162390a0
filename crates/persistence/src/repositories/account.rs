//! Account repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AccountEntity;
use crate::metrics::QueryTimer;

/// Repository for creator accounts.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_account_by_id");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, email, password_hash, username, region, is_premium, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an account by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_account_by_email");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, email, password_hash, username, region, is_premium, created_at, updated_at
            FROM accounts
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        username: &str,
        region: &str,
    ) -> Result<AccountEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_account");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            INSERT INTO accounts (email, password_hash, username, region)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, username, region, is_premium, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(username)
        .bind(region)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Flip the premium flag. Billing lives elsewhere.
    pub async fn set_premium(&self, id: Uuid, is_premium: bool) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_account_premium");
        let result = sqlx::query(
            "UPDATE accounts SET is_premium = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(is_premium)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }
}
