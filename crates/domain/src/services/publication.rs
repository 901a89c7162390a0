//! Publication orchestrator.
//!
//! Turns a completed wizard submission into a persisted wish: validate,
//! allocate a path, insert the wish, upload media, insert slides. Once the
//! wish row exists, individual upload failures are collected and reported
//! instead of aborting the publish.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use shared::password::hash_password;
use shared::slug;
use shared::validation::MIN_WISH_PASSWORD_LENGTH;

use crate::error::{AllocationFailure, StoreError, WishError};
use crate::models::catalog;
use crate::models::wish::reveal_instant;
use crate::models::{CallerIdentity, MusicType, NewSlide, NewWish, Privacy, Slide, Wish};
use crate::services::allocator::{resolve_path, suggest_alternative};
use crate::services::store::{BlobStore, WishStore};

const MAX_RECIPIENT_CHARS: usize = 100;
const MAX_NOTE_CHARS: usize = 500;
const MAX_SLIDE_NAME_CHARS: usize = 50;

/// Tunable publication limits.
#[derive(Debug, Clone)]
pub struct PublicationLimits {
    pub free_max_slides: usize,
    pub premium_max_slides: usize,
    pub max_image_bytes: usize,
    pub max_music_bytes: usize,
    /// Insert attempts when a concurrent publisher claims the same path.
    pub max_insert_attempts: u32,
}

impl Default for PublicationLimits {
    fn default() -> Self {
        Self {
            free_max_slides: 3,
            premium_max_slides: 10,
            max_image_bytes: 5 * 1024 * 1024,
            max_music_bytes: 10 * 1024 * 1024,
            max_insert_attempts: 3,
        }
    }
}

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// A slide as submitted by the wizard.
#[derive(Debug, Clone)]
pub struct SlideUpload {
    pub image: MediaFile,
    pub frame_shape: String,
    pub slide_name: String,
    pub transition_id: String,
    pub order_index: i32,
}

/// A completed wizard submission.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Raw wish name; normalized into the slug.
    pub wish_name: String,
    pub recipient_name: String,
    pub gradient_id: String,
    pub note_message: Option<String>,
    pub note_author: Option<String>,
    pub music_preset: Option<String>,
    pub custom_music: Option<MediaFile>,
    pub birthday_date: NaiveDate,
    pub birthday_time: Option<NaiveTime>,
    pub privacy: Privacy,
    pub password: Option<String>,
    pub slides: Vec<SlideUpload>,
}

/// Which upload failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadItem {
    Slide {
        #[serde(rename = "orderIndex")]
        order_index: i32,
    },
    Music,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadFailure {
    #[serde(flatten)]
    pub item: UploadItem,
    pub reason: String,
}

/// Result of a publish that reached the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub wish: Wish,
    pub slides: Vec<Slide>,
    pub failed_uploads: Vec<UploadFailure>,
}

impl PublishOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failed_uploads.is_empty()
    }
}

pub struct PublicationOrchestrator<'a> {
    store: &'a dyn WishStore,
    blobs: &'a dyn BlobStore,
    limits: PublicationLimits,
}

impl<'a> PublicationOrchestrator<'a> {
    pub fn new(store: &'a dyn WishStore, blobs: &'a dyn BlobStore, limits: PublicationLimits) -> Self {
        Self {
            store,
            blobs,
            limits,
        }
    }

    /// Publishes a wish for `caller`.
    pub async fn publish(
        &self,
        caller: &CallerIdentity,
        request: PublishRequest,
    ) -> Result<PublishOutcome, WishError> {
        let slug = self.validate(caller, &request)?;

        let password_hash = match (request.privacy, request.password.as_deref()) {
            (Privacy::Private, Some(password)) => Some(
                hash_password(password).map_err(|e| WishError::Store(e.to_string()))?,
            ),
            _ => None,
        };

        let music_type = if request.custom_music.is_some() {
            MusicType::Custom
        } else {
            MusicType::Preset
        };
        let birthday_time = request.birthday_time.unwrap_or(NaiveTime::MIN);

        let template = NewWish {
            owner_id: caller.id,
            custom_url: String::new(),
            recipient_name: request.recipient_name.trim().to_string(),
            gradient_id: request.gradient_id.clone(),
            note_message: non_empty(request.note_message.as_deref()),
            note_author: non_empty(request.note_author.as_deref()),
            music_type,
            music_preset: match music_type {
                MusicType::Preset => request.music_preset.clone(),
                MusicType::Custom => None,
            },
            birthday_date: request.birthday_date,
            birthday_time,
            reveal_at: reveal_instant(request.birthday_date, Some(birthday_time)),
            privacy: request.privacy,
            password_hash,
        };

        let mut wish = self.insert_with_retry(caller, &slug, template).await?;
        tracing::info!(
            wish_id = %wish.id,
            path = %wish.custom_url,
            owner_id = %caller.id,
            "Wish created"
        );

        let mut failed_uploads = Vec::new();
        let stamp = Utc::now().timestamp_millis();

        let mut uploads = request.slides;
        uploads.sort_by_key(|s| s.order_index);
        let mut new_slides = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let key = format!(
                "wish-images/{}/{}-{}.{}",
                wish.id,
                stamp,
                upload.order_index,
                image_extension(&upload.image.content_type).unwrap_or("bin")
            );
            match self
                .blobs
                .upload(&key, upload.image.bytes, &upload.image.content_type)
                .await
            {
                Ok(url) => new_slides.push(NewSlide {
                    wish_id: wish.id,
                    image_url: url,
                    frame_shape: upload.frame_shape,
                    slide_name: upload.slide_name.trim().to_string(),
                    transition_id: upload.transition_id,
                    order_index: upload.order_index,
                }),
                Err(e) => {
                    tracing::warn!(
                        wish_id = %wish.id,
                        order_index = upload.order_index,
                        error = %e,
                        "Slide image upload failed"
                    );
                    failed_uploads.push(UploadFailure {
                        item: UploadItem::Slide {
                            order_index: upload.order_index,
                        },
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(music) = request.custom_music {
            let key = format!(
                "wish-music/{}/{}.{}",
                wish.id,
                stamp,
                audio_extension(&music.content_type).unwrap_or("bin")
            );
            let stored = match self.blobs.upload(&key, music.bytes, &music.content_type).await {
                Ok(url) => match self.store.set_music_url(wish.id, &url).await {
                    Ok(()) => Ok(url),
                    Err(e) => Err(e.to_string()),
                },
                Err(e) => Err(e.to_string()),
            };
            match stored {
                Ok(url) => wish.music_url = Some(url),
                Err(reason) => {
                    tracing::warn!(wish_id = %wish.id, error = %reason, "Music upload failed");
                    failed_uploads.push(UploadFailure {
                        item: UploadItem::Music,
                        reason,
                    });
                }
            }
        }

        let order_indices: Vec<i32> = new_slides.iter().map(|s| s.order_index).collect();
        let slides = if new_slides.is_empty() {
            Vec::new()
        } else {
            match self.store.insert_slides(new_slides).await {
                Ok(slides) => slides,
                Err(e) => {
                    tracing::error!(wish_id = %wish.id, error = %e, "Slide rows could not be stored");
                    let reason = e.to_string();
                    failed_uploads.extend(order_indices.into_iter().map(|order_index| {
                        UploadFailure {
                            item: UploadItem::Slide { order_index },
                            reason: reason.clone(),
                        }
                    }));
                    Vec::new()
                }
            }
        };

        if !failed_uploads.is_empty() {
            tracing::warn!(
                wish_id = %wish.id,
                failed = failed_uploads.len(),
                "Wish published with missing media"
            );
        }

        Ok(PublishOutcome {
            wish,
            slides,
            failed_uploads,
        })
    }

    /// Inserts the wish, re-allocating when another publisher claims the
    /// path between the availability check and the insert.
    async fn insert_with_retry(
        &self,
        caller: &CallerIdentity,
        slug: &str,
        template: NewWish,
    ) -> Result<Wish, WishError> {
        let mut last_path = String::new();
        for attempt in 1..=self.limits.max_insert_attempts.max(1) {
            let allocation = resolve_path(self.store, caller, slug).await?;
            let mut new_wish = template.clone();
            new_wish.custom_url = allocation.path.clone();

            match self.store.insert_wish(new_wish).await {
                Ok(wish) => return Ok(wish),
                Err(StoreError::PathConflict(path)) => {
                    tracing::debug!(path = %path, attempt, "Path claimed concurrently");
                    if !caller.is_premium {
                        return Err(WishError::AllocationFailed(AllocationFailure::PathTaken {
                            path,
                            suggestion: suggest_alternative(slug),
                        }));
                    }
                    last_path = path;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(WishError::AllocationFailed(AllocationFailure::Contended {
            path: last_path,
        }))
    }

    /// Checks the submission and returns the normalized slug.
    fn validate(&self, caller: &CallerIdentity, request: &PublishRequest) -> Result<String, WishError> {
        let slug = slug::normalize(request.wish_name.trim());
        if !slug::has_content(&slug) {
            return Err(invalid("Wish name must contain letters or digits"));
        }

        let recipient = request.recipient_name.trim();
        if recipient.is_empty() {
            return Err(invalid("Recipient name is required"));
        }
        if recipient.chars().count() > MAX_RECIPIENT_CHARS {
            return Err(invalid("Recipient name must be at most 100 characters"));
        }

        if let Some(note) = request.note_message.as_deref() {
            if note.chars().count() > MAX_NOTE_CHARS {
                return Err(invalid("Note must be at most 500 characters"));
            }
        }

        if !catalog::is_gradient(&request.gradient_id) {
            return Err(invalid("Unknown gradient"));
        }

        match request.privacy {
            Privacy::Private => {
                let password = request.password.as_deref().unwrap_or("");
                if password.chars().count() < MIN_WISH_PASSWORD_LENGTH {
                    return Err(invalid("Password must be at least 6 characters"));
                }
            }
            Privacy::Public => {}
        }

        match (&request.custom_music, request.music_preset.as_deref()) {
            (Some(_), Some(_)) => {
                return Err(invalid("Choose either a preset or a custom track, not both"));
            }
            (Some(music), None) => {
                if !caller.is_premium {
                    return Err(invalid("Custom music requires a premium account"));
                }
                if audio_extension(&music.content_type).is_none() {
                    return Err(invalid("Unsupported audio format"));
                }
                if music.bytes.is_empty() || music.bytes.len() > self.limits.max_music_bytes {
                    return Err(invalid("Music file must be between 1 byte and 10MB"));
                }
            }
            (None, Some(preset)) => {
                if catalog::music_preset(preset).is_none() {
                    return Err(invalid("Unknown music preset"));
                }
            }
            (None, None) => {}
        }

        if request.slides.is_empty() {
            return Err(invalid("At least one slide is required"));
        }
        let max_slides = if caller.is_premium {
            self.limits.premium_max_slides
        } else {
            self.limits.free_max_slides
        };
        if request.slides.len() > max_slides {
            return Err(WishError::Validation(format!(
                "Your plan allows at most {} slides",
                max_slides
            )));
        }

        let mut indices: Vec<i32> = request.slides.iter().map(|s| s.order_index).collect();
        indices.sort_unstable();
        if indices.iter().zip(0..).any(|(&index, expected)| index != expected) {
            return Err(invalid("Slide order must be 0, 1, 2, ... without gaps"));
        }

        for slide in &request.slides {
            if slide.slide_name.trim().chars().count() > MAX_SLIDE_NAME_CHARS {
                return Err(invalid("Slide name must be at most 50 characters"));
            }
            if !catalog::is_frame_shape(&slide.frame_shape) {
                return Err(invalid("Unknown frame shape"));
            }
            if !catalog::is_transition(&slide.transition_id) {
                return Err(invalid("Unknown transition"));
            }
            if image_extension(&slide.image.content_type).is_none() {
                return Err(invalid("Unsupported image format"));
            }
            if slide.image.bytes.is_empty() || slide.image.bytes.len() > self.limits.max_image_bytes {
                return Err(invalid("Each image must be between 1 byte and 5MB"));
            }
        }

        Ok(slug)
    }
}

fn invalid(message: &str) -> WishError {
    WishError::Validation(message.to_string())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// File extension for an accepted image content type.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// File extension for an accepted audio content type.
pub fn audio_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" => Some("wav"),
        "audio/ogg" => Some("ogg"),
        _ => None,
    }
}
