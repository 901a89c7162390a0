//! Creator routes: availability, publication and wish management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{NaiveDate, NaiveTime};
use domain::models::{catalog, CallerIdentity, Privacy, Slide, WishSummary};
use domain::services::{
    allocate_vip_slot, build_candidate_path, check_availability, expire_wish, MediaFile,
    PublicationOrchestrator, PublishRequest, SlideUpload, UploadFailure,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_wish_published;
use crate::services::auth::AuthService;

/// Query parameters for the availability check.
#[derive(Debug, Deserialize, Validate)]
pub struct AvailabilityQuery {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Availability of a requested wish name for the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    /// Normalized name.
    pub slug: String,
    pub path: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// VIP path a premium caller would get instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_path: Option<String>,
}

/// Uploaded file as base64, optionally wrapped in a `data:` URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPayload {
    pub data: String,
    pub content_type: String,
}

impl MediaPayload {
    fn decode(self, what: &str) -> Result<MediaFile, ApiError> {
        let encoded = match self.data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.data.as_str(),
        };
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| ApiError::Validation(format!("{} is not valid base64", what)))?;
        Ok(MediaFile {
            bytes,
            content_type: self.content_type.trim().to_ascii_lowercase(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidePayload {
    pub image: MediaPayload,
    pub frame_shape: Option<String>,
    #[serde(default)]
    pub slide_name: String,
    pub transition_id: Option<String>,
    /// Defaults to the slide's position in the list.
    pub order_index: Option<i32>,
}

/// Request body for publishing a wish.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishWishRequest {
    #[validate(length(min = 1, max = 100, message = "Wish name must be 1-100 characters"))]
    pub wish_name: String,

    #[validate(length(min = 1, max = 100, message = "Recipient name must be 1-100 characters"))]
    pub recipient_name: String,

    /// Missing or blank is rejected in `into_domain`.
    pub gradient_id: Option<String>,

    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note_message: Option<String>,

    #[validate(length(max = 100, message = "Note author must be at most 100 characters"))]
    pub note_author: Option<String>,

    pub music_preset: Option<String>,
    pub custom_music: Option<MediaPayload>,

    /// `YYYY-MM-DD`
    pub birthday_date: NaiveDate,

    /// `HH:MM` or `HH:MM:SS`, UTC. Midnight when absent.
    pub birthday_time: Option<String>,

    #[serde(default)]
    pub privacy: Privacy,

    pub password: Option<String>,

    #[validate(length(min = 1, message = "At least one slide is required"))]
    pub slides: Vec<SlidePayload>,
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_birthday_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

impl PublishWishRequest {
    fn into_domain(self) -> Result<PublishRequest, ApiError> {
        let gradient_id = match self.gradient_id.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(ApiError::Validation("A gradient is required".to_string()))
            }
            Some(id) => id.to_string(),
        };

        let birthday_time = match self.birthday_time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_birthday_time(raw).ok_or_else(|| {
                ApiError::Validation("Birthday time must be HH:MM or HH:MM:SS".to_string())
            })?),
        };

        let custom_music = self
            .custom_music
            .map(|m| m.decode("Custom music"))
            .transpose()?;

        let slides = self
            .slides
            .into_iter()
            .enumerate()
            .map(|(position, slide)| -> Result<SlideUpload, ApiError> {
                let order_index = slide.order_index.unwrap_or(position as i32);
                Ok(SlideUpload {
                    image: slide.image.decode(&format!("Slide {} image", order_index))?,
                    frame_shape: slide
                        .frame_shape
                        .unwrap_or_else(|| catalog::DEFAULT_FRAME_SHAPE.to_string()),
                    slide_name: slide.slide_name,
                    transition_id: slide
                        .transition_id
                        .unwrap_or_else(|| catalog::DEFAULT_TRANSITION.to_string()),
                    order_index,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(PublishRequest {
            wish_name: self.wish_name,
            recipient_name: self.recipient_name,
            gradient_id,
            note_message: self.note_message,
            note_author: self.note_author,
            music_preset: self.music_preset.filter(|p| !p.trim().is_empty()),
            custom_music,
            birthday_date: self.birthday_date,
            birthday_time,
            privacy: self.privacy,
            password: self.password,
            slides,
        })
    }
}

/// Response body for a publish, possibly with failed uploads.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub wish: WishSummary,
    pub vip_slot: Option<u8>,
    pub slides: Vec<Slide>,
    pub failed_uploads: Vec<UploadFailure>,
    pub partial: bool,
}

async fn caller_identity(state: &AppState, auth: &UserAuth) -> Result<CallerIdentity, ApiError> {
    let account = AuthService::from_state(state)
        .account(auth.account_id)
        .await?;
    Ok(CallerIdentity::from(&account))
}

/// Check whether a wish name is free in the caller's region.
///
/// GET /api/v1/wishes/availability?name=
pub async fn availability(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    query.validate()?;
    let caller = caller_identity(&state, &auth).await?;

    let slug = shared::slug::normalize(query.name.trim());
    if !shared::slug::has_content(&slug) {
        return Err(ApiError::Validation(
            "Wish name must contain letters or digits".to_string(),
        ));
    }

    let path = build_candidate_path(&caller.region, &slug);
    let availability = check_availability(state.wishes.as_ref(), &path).await?;

    let vip_path = if !availability.available && caller.is_premium {
        allocate_vip_slot(state.wishes.as_ref(), &caller.region, &slug)
            .await?
            .map(|allocation| allocation.path)
    } else {
        None
    };

    Ok(Json(AvailabilityResponse {
        slug,
        path: availability.path,
        available: availability.available,
        suggestion: availability.suggestion,
        vip_path,
    }))
}

/// Publish a new wish.
///
/// POST /api/v1/wishes
pub async fn publish(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<PublishWishRequest>,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    request.validate()?;
    let caller = caller_identity(&state, &auth).await?;
    let request = request.into_domain()?;

    let orchestrator = PublicationOrchestrator::new(
        state.wishes.as_ref(),
        state.blobs.as_ref(),
        state.config.limits.publication(),
    );
    let outcome = orchestrator.publish(&caller, request).await?;
    let partial = outcome.is_partial();
    record_wish_published(caller.is_premium, partial);

    let vip_slot = outcome
        .wish
        .custom_url
        .split('/')
        .nth(1)
        .and_then(domain::services::parse_vip_slot);

    Ok((
        StatusCode::CREATED,
        Json(PublishResponse {
            wish: outcome.wish.into(),
            vip_slot,
            slides: outcome.slides,
            failed_uploads: outcome.failed_uploads,
            partial,
        }),
    ))
}

/// List the caller's wishes, newest first.
///
/// GET /api/v1/wishes
pub async fn list_wishes(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<WishSummary>>, ApiError> {
    let wishes = state.wishes.list_by_owner(auth.account_id).await?;
    Ok(Json(wishes.into_iter().map(WishSummary::from).collect()))
}

/// Delete one of the caller's wishes with its slides and comments.
///
/// DELETE /api/v1/wishes/:id
pub async fn delete_wish(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(wish_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let wish = state
        .wishes
        .find_by_id(wish_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wish not found".to_string()))?;

    if !wish.is_owned_by(auth.account_id) {
        return Err(ApiError::Forbidden(
            "Only the owner can delete this wish".to_string(),
        ));
    }

    if !state.wishes.delete_wish(wish_id).await? {
        return Err(ApiError::NotFound("Wish not found".to_string()));
    }

    tracing::info!(wish_id = %wish_id, owner_id = %auth.account_id, "Wish deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Expire one of the caller's wishes.
///
/// POST /api/v1/wishes/:id/expire
pub async fn expire(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(wish_id): Path<Uuid>,
) -> Result<Json<WishSummary>, ApiError> {
    let wish = expire_wish(state.wishes.as_ref(), wish_id, auth.account_id).await?;
    Ok(Json(wish.into()))
}
