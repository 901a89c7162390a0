//! Common test utilities for integration tests.
//!
//! These tests run against a real PostgreSQL database named by
//! `TEST_DATABASE_URL`. When the variable is unset every test returns early.

// Not every integration test binary uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use fake::{faker::name::en::FirstName, Fake};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;
use wish_api::{app::create_app, config::Config};

/// One 1x1 transparent PNG.
pub const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Create a test database pool, or `None` when no test database is configured.
pub async fn create_test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Test configuration pointing at the test database.
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_default();
    let mut all = vec![("database.url", url.as_str())];
    all.extend_from_slice(overrides);
    Config::load_for_test(&all).expect("Failed to build test config")
}

/// Router plus its pool, ready for `oneshot` requests.
pub struct TestApp {
    pub app: Router,
    pub pool: PgPool,
}

impl TestApp {
    pub async fn new() -> Option<Self> {
        Self::with_overrides(&[]).await
    }

    pub async fn with_overrides(overrides: &[(&str, &str)]) -> Option<Self> {
        let pool = create_test_pool().await?;
        let app = create_app(test_config(overrides), pool.clone());
        Some(Self { app, pool })
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Sends a request and returns the status and parsed JSON body.
    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        (status, parse_body(response).await)
    }
}

pub async fn parse_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Builds a JSON request, optionally with a bearer token.
pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Builds a bodyless request, optionally with a bearer token.
pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// A region code no other test uses, so paths never collide across tests.
pub fn unique_region() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("T{}", &id[..7])
}

pub fn unique_email() -> String {
    format!("test_{}@example.com", Uuid::new_v4())
}

/// A signed-up account with its session token.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub username: String,
    pub region: String,
    pub token: String,
}

impl TestApp {
    /// Signs up a new free account in `region`.
    pub async fn sign_up(&self, region: &str) -> TestAccount {
        let email = unique_email();
        let password = "birthday2024".to_string();
        let username: String = FirstName().fake();

        let (status, body) = self
            .call(json_request(
                Method::POST,
                "/api/v1/auth/sign-up",
                json!({
                    "email": email,
                    "password": password,
                    "username": username,
                    "region": region,
                }),
                None,
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", body);

        TestAccount {
            id: body["account"]["id"].as_str().unwrap().parse().unwrap(),
            email,
            password,
            username,
            region: region.to_string(),
            token: body["token"]["accessToken"].as_str().unwrap().to_string(),
        }
    }

    /// Signs up a new account and upgrades it to premium.
    pub async fn sign_up_premium(&self, region: &str) -> TestAccount {
        let account = self.sign_up(region).await;
        persistence::repositories::AccountRepository::new(self.pool.clone())
            .set_premium(account.id, true)
            .await
            .unwrap();
        account
    }

    /// Publishes a wish and returns status and body.
    pub async fn publish(&self, account: &TestAccount, body: Value) -> (StatusCode, Value) {
        self.call(json_request(
            Method::POST,
            "/api/v1/wishes",
            body,
            Some(&account.token),
        ))
        .await
    }
}

/// A publish request body with `slides` PNG slides.
pub fn wish_body(name: &str, birthday_date: &str, slides: usize) -> Value {
    let slides: Vec<Value> = (0..slides)
        .map(|i| {
            json!({
                "image": { "data": PNG_BASE64, "contentType": "image/png" },
                "slideName": format!("Slide {}", i),
                "orderIndex": i,
            })
        })
        .collect();

    json!({
        "wishName": name,
        "recipientName": FirstName().fake::<String>(),
        "gradientId": "sunset",
        "noteMessage": "Happy birthday!",
        "musicPreset": "happy-classic",
        "birthdayDate": birthday_date,
        "privacy": "public",
        "slides": slides,
    })
}

/// Same as [`wish_body`] but private with the given password.
pub fn private_wish_body(name: &str, birthday_date: &str, password: &str) -> Value {
    let mut body = wish_body(name, birthday_date, 1);
    body["privacy"] = json!("private");
    body["password"] = json!(password);
    body
}

/// A date that has already passed.
pub const PAST_DATE: &str = "2020-01-01";
/// A date far in the future.
pub const FUTURE_DATE: &str = "2099-12-31";
