//! Comment routes and the realtime comment feed.
//!
//! A thread is visible under the same rules as its wish: nothing before the
//! reveal, and a private wish needs its password. The password travels in
//! the `X-Wish-Password` header or the `password` query parameter, the
//! latter for WebSocket clients. Owners always see their own threads.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use domain::models::{Comment, CreateCommentRequest, NewComment, Privacy, Wish, WishStatus};
use domain::services::{evaluate_thread, GateDecision};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use persistence::repositories::CommentRepository;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ClientIp, OptionalUserAuth, UserAuth};
use crate::middleware::metrics::{record_comment_posted, record_password_rejected};
use crate::services::auth::AuthService;

async fn existing_wish(state: &AppState, wish_id: Uuid) -> Result<Wish, ApiError> {
    state
        .wishes
        .find_by_id(wish_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wish not found".to_string()))
}

pub const WISH_PASSWORD_HEADER: &str = "x-wish-password";

#[derive(Debug, Default, Deserialize)]
pub struct ThreadQuery {
    pub password: Option<String>,
}

/// Password attempt from the header, else from the query string.
pub fn thread_password(headers: &HeaderMap, query: ThreadQuery) -> Option<String> {
    headers
        .get(WISH_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or(query.password)
        .filter(|p| !p.is_empty())
}

/// Checks that this caller may see the thread of `wish`.
fn check_thread_access(
    state: &AppState,
    wish: &Wish,
    auth: Option<&UserAuth>,
    attempt: Option<String>,
    client: &ClientIp,
) -> Result<(), ApiError> {
    if auth.is_some_and(|a| wish.is_owned_by(a.account_id)) {
        return Ok(());
    }

    if attempt.is_some() && wish.privacy == Privacy::Private {
        let key = format!("{}:{}", wish.id, client.0);
        if let Err(retry_after) = state.unlock_limiter.check(&key) {
            tracing::warn!(wish_id = %wish.id, client = %client.0, "Too many password attempts");
            return Err(ApiError::RateLimited { retry_after });
        }
    }

    match evaluate_thread(wish, Utc::now(), attempt.as_deref()) {
        GateDecision::Reveal => Ok(()),
        GateDecision::Countdown { .. } => Err(ApiError::AccessDenied(
            "Comments open when the wish is revealed".to_string(),
        )),
        GateDecision::PasswordRequired => Err(ApiError::Unauthorized(
            "This wish is private. Enter the password to see its comments.".to_string(),
        )),
        GateDecision::AccessDenied => {
            record_password_rejected();
            Err(ApiError::AccessDenied(
                "Incorrect password. Please try again.".to_string(),
            ))
        }
        GateDecision::Expired => Err(ApiError::Gone("This wish has expired".to_string())),
    }
}

/// List comments for a wish, newest first.
///
/// GET /api/v1/wishes/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    OptionalUserAuth(auth): OptionalUserAuth,
    client: ClientIp,
    headers: HeaderMap,
    Path(wish_id): Path<Uuid>,
    Query(query): Query<ThreadQuery>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let wish = existing_wish(&state, wish_id).await?;
    check_thread_access(&state, &wish, auth.as_ref(), thread_password(&headers, query), &client)?;

    let comments = CommentRepository::new(state.pool.clone())
        .list_by_wish(wish_id, state.config.limits.comments_page_size)
        .await?;

    Ok(Json(comments.into_iter().map(Comment::from).collect()))
}

/// Post a comment as a guest or a signed-in account.
///
/// POST /api/v1/wishes/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    OptionalUserAuth(auth): OptionalUserAuth,
    client: ClientIp,
    headers: HeaderMap,
    Path(wish_id): Path<Uuid>,
    Query(query): Query<ThreadQuery>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    request.validate()?;

    let wish = existing_wish(&state, wish_id).await?;
    if wish.status == WishStatus::Expired {
        return Err(ApiError::Gone(
            "This wish has expired and no longer accepts comments".to_string(),
        ));
    }
    check_thread_access(&state, &wish, auth.as_ref(), thread_password(&headers, query), &client)?;

    let author = match &auth {
        Some(auth) => Some(
            AuthService::from_state(&state)
                .account(auth.account_id)
                .await?,
        ),
        None => None,
    };

    let new_comment = NewComment::from_request(
        wish_id,
        request,
        author.as_ref().map(|a| (a.id, a.username.as_str())),
    )
    .ok_or_else(|| {
        ApiError::Validation("A name and a non-empty message are required".to_string())
    })?;

    let comment: Comment = CommentRepository::new(state.pool.clone())
        .create(&new_comment)
        .await?
        .into();

    record_comment_posted();
    let receivers = state.comment_feed.publish(comment.clone());
    tracing::info!(
        wish_id = %wish_id,
        comment_id = %comment.id,
        guest = comment.author_id.is_none(),
        receivers,
        "Comment posted"
    );

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Stream new comments for a wish over a WebSocket.
///
/// GET /api/v1/wishes/:id/comments/live
pub async fn live_comments(
    State(state): State<AppState>,
    OptionalUserAuth(auth): OptionalUserAuth,
    client: ClientIp,
    headers: HeaderMap,
    Path(wish_id): Path<Uuid>,
    Query(query): Query<ThreadQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let wish = existing_wish(&state, wish_id).await?;
    check_thread_access(&state, &wish, auth.as_ref(), thread_password(&headers, query), &client)?;

    // Subscribe before the upgrade so nothing posted in between is missed.
    let rx = state.comment_feed.subscribe();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, wish_id, rx)))
}

async fn handle_socket(socket: WebSocket, wish_id: Uuid, mut rx: broadcast::Receiver<Comment>) {
    tracing::debug!(wish_id = %wish_id, "Comment feed connected");

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        loop {
            let comment = match rx.recv().await {
                Ok(comment) => comment,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(wish_id = %wish_id, skipped, "Comment feed subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if comment.wish_id != wish_id {
                continue;
            }
            let payload = match serde_json::to_string(&comment) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize comment");
                    continue;
                }
            };
            if sink.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(wish_id = %wish_id, error = %e, "Comment feed receive error");
                break;
            }
        }
    }

    send_task.abort();
    tracing::debug!(wish_id = %wish_id, "Comment feed disconnected");
}
