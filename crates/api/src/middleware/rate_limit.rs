//! Rate limiting.
//!
//! [`RateLimiterState`] holds one governor limiter per key. The same type
//! backs the per-client request limiter and the per-wish password attempt
//! limiter.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum::response::IntoResponse;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Arc, PoisonError, RwLock},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::client_ip::client_ip_from_parts;

type KeyRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Stops tracking keys after this many; the map is rebuilt from scratch.
const MAX_TRACKED_KEYS: usize = 100_000;

pub struct RateLimiterState {
    limiters: RwLock<HashMap<String, Arc<KeyRateLimiter>>>,
    quota: Quota,
    per_minute: u32,
}

impl RateLimiterState {
    /// Creates a limiter allowing `per_minute` events per key. Zero is
    /// treated as one.
    pub fn new(per_minute: u32) -> Self {
        let per_minute = per_minute.max(1);
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            limiters: RwLock::new(HashMap::new()),
            quota,
            per_minute,
        }
    }

    pub fn per_minute(&self) -> u32 {
        self.per_minute
    }

    fn limiter_for(&self, key: &str) -> Arc<KeyRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(limiter) = limiters.get(key) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(limiter) = limiters.get(key) {
            return limiter.clone();
        }
        if limiters.len() >= MAX_TRACKED_KEYS {
            tracing::warn!(keys = limiters.len(), "Rate limiter key table full, resetting");
            limiters.clear();
        }
        let limiter = Arc::new(GovRateLimiter::direct(self.quota));
        limiters.insert(key.to_string(), limiter.clone());
        limiter
    }

    /// Consumes one event for `key`. On rejection returns the number of
    /// seconds until the next event is allowed (at least 1).
    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.limiter_for(key).check().map_err(|not_until| {
            not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs()
                .max(1)
        })
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tracked = self
            .limiters
            .read()
            .map(|l| l.len())
            .unwrap_or_default();
        f.debug_struct("RateLimiterState")
            .field("per_minute", &self.per_minute)
            .field("tracked_keys", &tracked)
            .finish()
    }
}

/// Limits requests per client address.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        let client = client_ip_from_parts(req.headers(), req.extensions());
        if let Err(retry_after) = limiter.check(&client) {
            tracing::warn!(client = %client, retry_after, "Client rate limited");
            return ApiError::RateLimited { retry_after }.into_response();
        }
    }

    next.run(req).await
}
