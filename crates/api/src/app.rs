use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{BlobStore, WishStore};
use persistence::PgWishStore;
use shared::jwt::SessionSigner;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{auth, catalog, comments, health, visitor, wishes};
use crate::services::{CommentFeed, LocalBlobStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub wishes: Arc<dyn WishStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub signer: Arc<SessionSigner>,
    pub comment_feed: CommentFeed,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub unlock_limiter: Arc<RateLimiterState>,
}

impl AppState {
    /// Builds the state with the Postgres wish store and the filesystem
    /// blob store from configuration.
    pub fn new(config: Config, pool: PgPool) -> Self {
        let blobs = LocalBlobStore::new(
            config.storage.media_dir.clone(),
            &config.storage.public_url_prefix,
        );
        Self::with_blob_store(config, pool, Arc::new(blobs))
    }

    pub fn with_blob_store(config: Config, pool: PgPool, blobs: Arc<dyn BlobStore>) -> Self {
        let signer = SessionSigner::new(
            &config.jwt.secret,
            config.jwt.token_expiry_secs,
            config.jwt.leeway_secs,
        );

        // Zero disables the per-client limiter.
        let rate_limiter = (config.security.rate_limit_per_minute > 0).then(|| {
            Arc::new(RateLimiterState::new(
                config.security.rate_limit_per_minute,
            ))
        });

        Self {
            wishes: Arc::new(PgWishStore::new(pool.clone())),
            blobs,
            signer: Arc::new(signer),
            comment_feed: CommentFeed::new(config.limits.comment_feed_capacity),
            rate_limiter,
            unlock_limiter: Arc::new(RateLimiterState::new(
                config.security.unlock_attempts_per_minute,
            )),
            pool,
            config: Arc::new(config),
        }
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    build_router(AppState::new(config, pool))
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let account_routes = Router::new()
        .route("/api/v1/auth/sign-up", post(auth::sign_up))
        .route("/api/v1/auth/sign-in", post(auth::sign_in))
        .route("/api/v1/auth/sign-out", post(auth::sign_out))
        .route("/api/v1/auth/session", get(auth::session));

    let creator_routes = Router::new()
        .route(
            "/api/v1/wishes",
            get(wishes::list_wishes).post(wishes::publish),
        )
        .route("/api/v1/wishes/availability", get(wishes::availability))
        .route(
            "/api/v1/wishes/:id",
            axum::routing::delete(wishes::delete_wish),
        )
        .route("/api/v1/wishes/:id/expire", post(wishes::expire));

    let comment_routes = Router::new()
        .route(
            "/api/v1/wishes/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/v1/wishes/:id/comments/live",
            get(comments::live_comments),
        );

    let visitor_routes = Router::new()
        .route(
            "/api/v1/paths/:region/:name",
            get(visitor::view_by_path).post(visitor::unlock_by_path),
        )
        .route(
            "/api/v1/paths/:region/:slot/:name",
            get(visitor::view_by_vip_path).post(visitor::unlock_by_vip_path),
        )
        .route(
            "/api/v1/wish/:id",
            get(visitor::view_by_id).post(visitor::unlock_by_id),
        )
        .route(
            "/api/v1/wish/:id/view",
            get(visitor::view_by_id).post(visitor::unlock_by_id),
        )
        .route("/api/v1/wish/:id/expired", get(visitor::expired_summary))
        .route("/api/v1/catalog", get(catalog::catalog));

    let api_routes = Router::new()
        .merge(account_routes)
        .merge(creator_routes)
        .merge(comment_routes)
        .merge(visitor_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let media = ServeDir::new(&config.storage.media_dir);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .nest_service(&config.storage.public_url_prefix, media)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
