//! Collaborator traits for storage.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NewSlide, NewWish, Slide, Wish};

/// Relational storage for wishes and their slides.
#[async_trait]
pub trait WishStore: Send + Sync {
    /// Returns true if any wish already holds `path` as its custom URL.
    async fn path_exists(&self, path: &str) -> Result<bool, StoreError>;

    /// Inserts a wish in `scheduled` state.
    ///
    /// Fails with [`StoreError::PathConflict`] when the custom URL is taken.
    async fn insert_wish(&self, wish: NewWish) -> Result<Wish, StoreError>;

    async fn set_music_url(&self, wish_id: Uuid, url: &str) -> Result<(), StoreError>;

    async fn insert_slides(&self, slides: Vec<NewSlide>) -> Result<Vec<Slide>, StoreError>;

    async fn find_by_path(&self, path: &str) -> Result<Option<Wish>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Wish>, StoreError>;

    /// Slides of a wish ordered by `order_index`.
    async fn list_slides(&self, wish_id: Uuid) -> Result<Vec<Slide>, StoreError>;

    /// Counts a successful visit and activates a scheduled wish.
    ///
    /// Must be a single atomic statement guarded by the store's own clock:
    /// nothing changes unless the wish is not expired and its reveal instant
    /// has passed. Returns the updated wish, or `None` if the guard failed.
    async fn record_view(&self, wish_id: Uuid) -> Result<Option<Wish>, StoreError>;

    /// Moves a wish to `expired`. Returns `None` if the wish does not exist.
    async fn mark_expired(&self, wish_id: Uuid) -> Result<Option<Wish>, StoreError>;

    /// Wishes owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Wish>, StoreError>;

    /// Deletes a wish and its slides. Returns false if nothing was deleted.
    async fn delete_wish(&self, wish_id: Uuid) -> Result<bool, StoreError>;
}

/// Errors from blob uploads.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Invalid blob key: {0}")]
    InvalidKey(String),

    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Object storage for uploaded media.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL.
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String, BlobError>;
}
