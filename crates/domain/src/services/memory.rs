//! In-memory collaborators for development and tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NewSlide, NewWish, Slide, Wish, WishStatus};
use crate::services::store::{BlobError, BlobStore, WishStore};

#[derive(Debug, Default)]
struct WishState {
    wishes: HashMap<Uuid, Wish>,
    slides: Vec<Slide>,
    claimed: HashSet<String>,
    stolen: HashSet<String>,
    fail_slide_inserts: bool,
}

impl WishState {
    fn path_taken(&self, path: &str) -> bool {
        self.claimed.contains(path) || self.wishes.values().any(|w| w.custom_url == path)
    }
}

/// Wish store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryWishStore {
    state: Mutex<WishState>,
}

impl InMemoryWishStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` as taken without creating a wish.
    pub async fn claim_path(&self, path: &str) {
        self.state.lock().await.claimed.insert(path.to_string());
    }

    /// Makes the next insert on `path` lose a race: the insert fails with a
    /// conflict and the path becomes taken.
    pub async fn steal_on_insert(&self, path: &str) {
        self.state.lock().await.stolen.insert(path.to_string());
    }

    /// Makes every later `insert_slides` call fail.
    pub async fn fail_slide_inserts(&self) {
        self.state.lock().await.fail_slide_inserts = true;
    }

    pub async fn wish_count(&self) -> usize {
        self.state.lock().await.wishes.len()
    }
}

#[async_trait]
impl WishStore for InMemoryWishStore {
    async fn path_exists(&self, path: &str) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.path_taken(path))
    }

    async fn insert_wish(&self, new_wish: NewWish) -> Result<Wish, StoreError> {
        let mut state = self.state.lock().await;
        if state.stolen.remove(&new_wish.custom_url) {
            state.claimed.insert(new_wish.custom_url.clone());
            return Err(StoreError::PathConflict(new_wish.custom_url));
        }
        if state.path_taken(&new_wish.custom_url) {
            return Err(StoreError::PathConflict(new_wish.custom_url));
        }

        let now = Utc::now();
        let wish = Wish {
            id: Uuid::new_v4(),
            owner_id: new_wish.owner_id,
            custom_url: new_wish.custom_url,
            recipient_name: new_wish.recipient_name,
            gradient_id: new_wish.gradient_id,
            note_message: new_wish.note_message,
            note_author: new_wish.note_author,
            music_type: new_wish.music_type,
            music_preset: new_wish.music_preset,
            music_url: None,
            birthday_date: new_wish.birthday_date,
            birthday_time: new_wish.birthday_time,
            reveal_at: new_wish.reveal_at,
            privacy: new_wish.privacy,
            password_hash: new_wish.password_hash,
            status: WishStatus::Scheduled,
            views_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.wishes.insert(wish.id, wish.clone());
        Ok(wish)
    }

    async fn set_music_url(&self, wish_id: Uuid, url: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let wish = state.wishes.get_mut(&wish_id).ok_or(StoreError::NotFound)?;
        wish.music_url = Some(url.to_string());
        wish.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_slides(&self, slides: Vec<NewSlide>) -> Result<Vec<Slide>, StoreError> {
        let mut state = self.state.lock().await;
        if state.fail_slide_inserts {
            return Err(StoreError::Backend("slide insert rejected".to_string()));
        }
        let now = Utc::now();
        let mut inserted = Vec::with_capacity(slides.len());
        for slide in slides {
            if !state.wishes.contains_key(&slide.wish_id) {
                return Err(StoreError::NotFound);
            }
            let row = Slide {
                id: Uuid::new_v4(),
                wish_id: slide.wish_id,
                image_url: slide.image_url,
                frame_shape: slide.frame_shape,
                slide_name: slide.slide_name,
                transition_id: slide.transition_id,
                order_index: slide.order_index,
                created_at: now,
            };
            state.slides.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn find_by_path(&self, path: &str) -> Result<Option<Wish>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.wishes.values().find(|w| w.custom_url == path).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Wish>, StoreError> {
        Ok(self.state.lock().await.wishes.get(&id).cloned())
    }

    async fn list_slides(&self, wish_id: Uuid) -> Result<Vec<Slide>, StoreError> {
        let state = self.state.lock().await;
        let mut slides: Vec<Slide> = state
            .slides
            .iter()
            .filter(|s| s.wish_id == wish_id)
            .cloned()
            .collect();
        slides.sort_by_key(|s| s.order_index);
        Ok(slides)
    }

    async fn record_view(&self, wish_id: Uuid) -> Result<Option<Wish>, StoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let Some(wish) = state.wishes.get_mut(&wish_id) else {
            return Ok(None);
        };
        if wish.status == WishStatus::Expired || wish.reveal_at > now {
            return Ok(None);
        }
        wish.views_count += 1;
        if wish.status == WishStatus::Scheduled {
            wish.status = WishStatus::Active;
        }
        wish.updated_at = now;
        Ok(Some(wish.clone()))
    }

    async fn mark_expired(&self, wish_id: Uuid) -> Result<Option<Wish>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.wishes.get_mut(&wish_id).map(|wish| {
            wish.status = WishStatus::Expired;
            wish.updated_at = Utc::now();
            wish.clone()
        }))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Wish>, StoreError> {
        let state = self.state.lock().await;
        let mut wishes: Vec<Wish> = state
            .wishes
            .values()
            .filter(|w| w.owner_id == owner_id)
            .cloned()
            .collect();
        wishes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(wishes)
    }

    async fn delete_wish(&self, wish_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let removed = state.wishes.remove(&wish_id).is_some();
        state.slides.retain(|s| s.wish_id != wish_id);
        Ok(removed)
    }
}

/// Blob store that keeps uploads in memory.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, (Vec<u8>, String)>>,
    failing: Mutex<Vec<String>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes uploads fail for every key containing `fragment`.
    pub async fn fail_keys_containing(&self, fragment: &str) {
        self.failing.lock().await.push(fragment.to_string());
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.blobs.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobError> {
        if self.failing.lock().await.iter().any(|f| key.contains(f.as_str())) {
            return Err(BlobError::Upload(format!("simulated failure for {}", key)));
        }
        self.blobs
            .lock()
            .await
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(format!("memory://{}", key))
    }
}

/// A minimal public wish for tests.
#[cfg(test)]
pub(crate) fn sample_new_wish(
    owner_id: Uuid,
    path: &str,
    reveal_at: chrono::DateTime<Utc>,
) -> NewWish {
    NewWish {
        owner_id,
        custom_url: path.to_string(),
        recipient_name: "Sam".to_string(),
        gradient_id: "sunset".to_string(),
        note_message: None,
        note_author: None,
        music_type: crate::models::MusicType::Preset,
        music_preset: Some("happy-classic".to_string()),
        birthday_date: reveal_at.date_naive(),
        birthday_time: reveal_at.time(),
        reveal_at,
        privacy: crate::models::Privacy::Public,
        password_hash: None,
    }
}
