//! Wish repository for database operations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MusicTypeDb, PrivacyDb, WishEntity};
use crate::metrics::QueryTimer;

/// Insert payload for the wishes table.
#[derive(Debug, Clone)]
pub struct NewWishRow<'a> {
    pub owner_id: Uuid,
    pub custom_url: &'a str,
    pub recipient_name: &'a str,
    pub gradient_id: &'a str,
    pub note_message: Option<&'a str>,
    pub note_author: Option<&'a str>,
    pub music_type: MusicTypeDb,
    pub music_preset: Option<&'a str>,
    pub birthday_date: NaiveDate,
    pub birthday_time: NaiveTime,
    pub reveal_at: DateTime<Utc>,
    pub privacy: PrivacyDb,
    pub password_hash: Option<&'a str>,
}

/// Repository for wish database operations.
#[derive(Clone)]
pub struct WishRepository {
    pool: PgPool,
}

impl WishRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a custom URL is already held by a wish.
    pub async fn path_exists(&self, custom_url: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("wish_path_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM wishes WHERE custom_url = $1)",
        )
        .bind(custom_url)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a wish in `scheduled` state.
    ///
    /// A taken custom URL surfaces as a unique violation (`23505`) on
    /// `wishes_custom_url_key`.
    pub async fn insert(&self, row: NewWishRow<'_>) -> Result<WishEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_wish");
        let result = sqlx::query_as::<_, WishEntity>(
            r#"
            INSERT INTO wishes (
                owner_id, custom_url, recipient_name, gradient_id, note_message, note_author,
                music_type, music_preset, birthday_date, birthday_time, reveal_at,
                privacy, password_hash, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'scheduled')
            RETURNING id, owner_id, custom_url, recipient_name, gradient_id, note_message,
                      note_author, music_type, music_preset, music_url, birthday_date,
                      birthday_time, reveal_at, privacy, password_hash, status, views_count,
                      created_at, updated_at
            "#,
        )
        .bind(row.owner_id)
        .bind(row.custom_url)
        .bind(row.recipient_name)
        .bind(row.gradient_id)
        .bind(row.note_message)
        .bind(row.note_author)
        .bind(row.music_type)
        .bind(row.music_preset)
        .bind(row.birthday_date)
        .bind(row.birthday_time)
        .bind(row.reveal_at)
        .bind(row.privacy)
        .bind(row.password_hash)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn set_music_url(&self, id: Uuid, music_url: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_wish_music_url");
        let result = sqlx::query(
            r#"
            UPDATE wishes
            SET music_url = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(music_url)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<WishEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_wish_by_id");
        let result = sqlx::query_as::<_, WishEntity>(
            r#"
            SELECT id, owner_id, custom_url, recipient_name, gradient_id, note_message,
                   note_author, music_type, music_preset, music_url, birthday_date,
                   birthday_time, reveal_at, privacy, password_hash, status, views_count,
                   created_at, updated_at
            FROM wishes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_path(&self, custom_url: &str) -> Result<Option<WishEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_wish_by_path");
        let result = sqlx::query_as::<_, WishEntity>(
            r#"
            SELECT id, owner_id, custom_url, recipient_name, gradient_id, note_message,
                   note_author, music_type, music_preset, music_url, birthday_date,
                   birthday_time, reveal_at, privacy, password_hash, status, views_count,
                   created_at, updated_at
            FROM wishes
            WHERE custom_url = $1
            "#,
        )
        .bind(custom_url)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count a view and activate a scheduled wish in one statement.
    ///
    /// Guarded by the database clock; returns `None` when the wish is
    /// expired, not yet revealed, or missing.
    pub async fn record_view(&self, id: Uuid) -> Result<Option<WishEntity>, sqlx::Error> {
        let timer = QueryTimer::new("record_wish_view");
        let result = sqlx::query_as::<_, WishEntity>(
            r#"
            UPDATE wishes
            SET views_count = views_count + 1,
                status = CASE WHEN status = 'scheduled' THEN 'active'::wish_status ELSE status END,
                updated_at = NOW()
            WHERE id = $1 AND status <> 'expired' AND reveal_at <= NOW()
            RETURNING id, owner_id, custom_url, recipient_name, gradient_id, note_message,
                      note_author, music_type, music_preset, music_url, birthday_date,
                      birthday_time, reveal_at, privacy, password_hash, status, views_count,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn mark_expired(&self, id: Uuid) -> Result<Option<WishEntity>, sqlx::Error> {
        let timer = QueryTimer::new("expire_wish");
        let result = sqlx::query_as::<_, WishEntity>(
            r#"
            UPDATE wishes
            SET status = 'expired', updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, custom_url, recipient_name, gradient_id, note_message,
                      note_author, music_type, music_preset, music_url, birthday_date,
                      birthday_time, reveal_at, privacy, password_hash, status, views_count,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Wishes owned by an account, newest first.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<WishEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_wishes_by_owner");
        let result = sqlx::query_as::<_, WishEntity>(
            r#"
            SELECT id, owner_id, custom_url, recipient_name, gradient_id, note_message,
                   note_author, music_type, music_preset, music_url, birthday_date,
                   birthday_time, reveal_at, privacy, password_hash, status, views_count,
                   created_at, updated_at
            FROM wishes
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a wish; slides and comments go with it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_wish");
        let result = sqlx::query("DELETE FROM wishes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }
}
