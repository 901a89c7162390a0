//! Visitor routes: resolve a public path and pass the access gate.
//!
//! `GET` is a plain visit. `POST` carries a password attempt for a private
//! wish. Attempts are rate limited per wish and client address.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Slide, Wish, WishStatus, WishView};
use domain::services::{build_candidate_path, open_wish, parse_vip_slot, vip_path, Visit};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ClientIp;
use crate::middleware::metrics::{record_password_rejected, record_wish_revealed};

/// Password attempt for a private wish.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlockRequest {
    #[serde(default)]
    pub password: String,
}

/// Gate outcome as seen by the visitor page.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VisitResponse {
    Content {
        wish: WishView,
        slides: Vec<Slide>,
    },
    #[serde(rename_all = "camelCase")]
    Countdown {
        recipient_name: String,
        reveal_at: DateTime<Utc>,
        seconds_remaining: i64,
    },
    PasswordRequired {
        error: &'static str,
        message: &'static str,
    },
}

impl IntoResponse for VisitResponse {
    fn into_response(self) -> Response {
        let status = match &self {
            VisitResponse::PasswordRequired { .. } => StatusCode::UNAUTHORIZED,
            _ => StatusCode::OK,
        };
        (status, Json(self)).into_response()
    }
}

/// What the expired page shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredSummary {
    pub id: Uuid,
    pub custom_url: String,
    pub recipient_name: String,
    pub birthday_date: NaiveDate,
    pub status: WishStatus,
}

fn not_found() -> ApiError {
    ApiError::NotFound("This wish does not exist".to_string())
}

async fn find_by_path(state: &AppState, path: &str) -> Result<Wish, ApiError> {
    state.wishes.find_by_path(path).await?.ok_or_else(not_found)
}

async fn find_by_id(state: &AppState, raw_id: &str) -> Result<Wish, ApiError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    state.wishes.find_by_id(id).await?.ok_or_else(not_found)
}

async fn find_by_vip_path(
    state: &AppState,
    region: &str,
    slot: &str,
    name: &str,
) -> Result<Wish, ApiError> {
    let slot = parse_vip_slot(slot).ok_or_else(not_found)?;
    find_by_path(state, &vip_path(region, slot, name)).await
}

/// Runs the gate once for this request.
async fn visit(
    state: &AppState,
    wish: Wish,
    attempt: Option<String>,
    client: &ClientIp,
) -> Result<VisitResponse, ApiError> {
    let attempt = attempt.filter(|a| !a.is_empty());
    if attempt.is_some() {
        let key = format!("{}:{}", wish.id, client.0);
        if let Err(retry_after) = state.unlock_limiter.check(&key) {
            tracing::warn!(wish_id = %wish.id, client = %client.0, "Too many password attempts");
            return Err(ApiError::RateLimited { retry_after });
        }
    }

    let wish_id = wish.id;
    let recipient_name = wish.recipient_name.clone();
    let visit = open_wish(state.wishes.as_ref(), wish, Utc::now(), attempt.as_deref()).await;

    match visit {
        Ok(Visit::Content { wish, slides }) => {
            record_wish_revealed();
            tracing::debug!(wish_id = %wish_id, views = wish.views_count, "Wish revealed");
            Ok(VisitResponse::Content {
                wish: WishView::from(&wish),
                slides,
            })
        }
        Ok(Visit::Countdown {
            reveal_at,
            seconds_remaining,
        }) => Ok(VisitResponse::Countdown {
            recipient_name,
            reveal_at,
            seconds_remaining,
        }),
        Ok(Visit::PasswordRequired) => Ok(VisitResponse::PasswordRequired {
            error: "password_required",
            message: "This wish is private. Enter the password to open it.",
        }),
        Err(domain::error::WishError::AccessDenied) => {
            record_password_rejected();
            tracing::info!(wish_id = %wish_id, "Wrong wish password");
            Err(ApiError::AccessDenied(
                "Incorrect password. Please try again.".to_string(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /api/v1/paths/:region/:name
pub async fn view_by_path(
    State(state): State<AppState>,
    client: ClientIp,
    Path((region, name)): Path<(String, String)>,
) -> Result<VisitResponse, ApiError> {
    let wish = find_by_path(&state, &build_candidate_path(&region, &name)).await?;
    visit(&state, wish, None, &client).await
}

/// POST /api/v1/paths/:region/:name
pub async fn unlock_by_path(
    State(state): State<AppState>,
    client: ClientIp,
    Path((region, name)): Path<(String, String)>,
    Json(request): Json<UnlockRequest>,
) -> Result<VisitResponse, ApiError> {
    let wish = find_by_path(&state, &build_candidate_path(&region, &name)).await?;
    visit(&state, wish, Some(request.password), &client).await
}

/// GET /api/v1/paths/:region/:slot/:name
pub async fn view_by_vip_path(
    State(state): State<AppState>,
    client: ClientIp,
    Path((region, slot, name)): Path<(String, String, String)>,
) -> Result<VisitResponse, ApiError> {
    let wish = find_by_vip_path(&state, &region, &slot, &name).await?;
    visit(&state, wish, None, &client).await
}

/// POST /api/v1/paths/:region/:slot/:name
pub async fn unlock_by_vip_path(
    State(state): State<AppState>,
    client: ClientIp,
    Path((region, slot, name)): Path<(String, String, String)>,
    Json(request): Json<UnlockRequest>,
) -> Result<VisitResponse, ApiError> {
    let wish = find_by_vip_path(&state, &region, &slot, &name).await?;
    visit(&state, wish, Some(request.password), &client).await
}

/// GET /api/v1/wish/:id and GET /api/v1/wish/:id/view
pub async fn view_by_id(
    State(state): State<AppState>,
    client: ClientIp,
    Path(id): Path<String>,
) -> Result<VisitResponse, ApiError> {
    let wish = find_by_id(&state, &id).await?;
    visit(&state, wish, None, &client).await
}

/// POST /api/v1/wish/:id and POST /api/v1/wish/:id/view
pub async fn unlock_by_id(
    State(state): State<AppState>,
    client: ClientIp,
    Path(id): Path<String>,
    Json(request): Json<UnlockRequest>,
) -> Result<VisitResponse, ApiError> {
    let wish = find_by_id(&state, &id).await?;
    visit(&state, wish, Some(request.password), &client).await
}

/// Summary for the expired page. Not found unless the wish has expired.
///
/// GET /api/v1/wish/:id/expired
pub async fn expired_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExpiredSummary>, ApiError> {
    let wish = find_by_id(&state, &id).await?;
    if wish.status != WishStatus::Expired {
        return Err(not_found());
    }
    Ok(Json(ExpiredSummary {
        id: wish.id,
        custom_url: wish.custom_url,
        recipient_name: wish.recipient_name,
        birthday_date: wish.birthday_date,
        status: wish.status,
    }))
}
