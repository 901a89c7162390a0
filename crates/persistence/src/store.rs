//! PostgreSQL implementation of the domain `WishStore`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::error::StoreError;
use domain::models::{NewSlide, NewWish, Slide, Wish};
use domain::services::WishStore;

use crate::repositories::{NewWishRow, SlideRepository, WishRepository};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgWishStore {
    wishes: WishRepository,
    slides: SlideRepository,
}

impl PgWishStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            wishes: WishRepository::new(pool.clone()),
            slides: SlideRepository::new(pool),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl WishStore for PgWishStore {
    async fn path_exists(&self, path: &str) -> Result<bool, StoreError> {
        self.wishes.path_exists(path).await.map_err(backend)
    }

    async fn insert_wish(&self, wish: NewWish) -> Result<Wish, StoreError> {
        let row = NewWishRow {
            owner_id: wish.owner_id,
            custom_url: &wish.custom_url,
            recipient_name: &wish.recipient_name,
            gradient_id: &wish.gradient_id,
            note_message: wish.note_message.as_deref(),
            note_author: wish.note_author.as_deref(),
            music_type: wish.music_type.into(),
            music_preset: wish.music_preset.as_deref(),
            birthday_date: wish.birthday_date,
            birthday_time: wish.birthday_time,
            reveal_at: wish.reveal_at,
            privacy: wish.privacy.into(),
            password_hash: wish.password_hash.as_deref(),
        };

        match self.wishes.insert(row).await {
            Ok(entity) => Ok(entity.into()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::PathConflict(wish.custom_url)),
            Err(e) => Err(backend(e)),
        }
    }

    async fn set_music_url(&self, wish_id: Uuid, url: &str) -> Result<(), StoreError> {
        match self.wishes.set_music_url(wish_id, url).await.map_err(backend)? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn insert_slides(&self, slides: Vec<NewSlide>) -> Result<Vec<Slide>, StoreError> {
        let rows = self.slides.insert_batch(&slides).await.map_err(backend)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_path(&self, path: &str) -> Result<Option<Wish>, StoreError> {
        let entity = self.wishes.find_by_path(path).await.map_err(backend)?;
        Ok(entity.map(Into::into))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Wish>, StoreError> {
        let entity = self.wishes.find_by_id(id).await.map_err(backend)?;
        Ok(entity.map(Into::into))
    }

    async fn list_slides(&self, wish_id: Uuid) -> Result<Vec<Slide>, StoreError> {
        let rows = self.slides.list_by_wish(wish_id).await.map_err(backend)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn record_view(&self, wish_id: Uuid) -> Result<Option<Wish>, StoreError> {
        let entity = self.wishes.record_view(wish_id).await.map_err(backend)?;
        Ok(entity.map(Into::into))
    }

    async fn mark_expired(&self, wish_id: Uuid) -> Result<Option<Wish>, StoreError> {
        let entity = self.wishes.mark_expired(wish_id).await.map_err(backend)?;
        Ok(entity.map(Into::into))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Wish>, StoreError> {
        let rows = self.wishes.list_by_owner(owner_id).await.map_err(backend)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_wish(&self, wish_id: Uuid) -> Result<bool, StoreError> {
        self.wishes.delete(wish_id).await.map_err(backend)
    }
}
