//! Shared fixtures: an app wired over an in-memory database, plus small
//! request/response helpers for driving the router with `oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use api_adapters::metrics::ApiMetrics;
use api_adapters::{router, AppState};
use auth_adapters::{ArgonPasswords, JwtSessions};
use domains::{Beer, CatalogRepo, Passwords, SessionTokens, User, UserRepo};
use services::{
    AuthService, CatalogService, CommentService, FavoriteService, ProfileService, RatingService,
};
use storage_adapters::SqliteStore;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteStore>,
}

pub async fn app() -> TestApp {
    let store = Arc::new(SqliteStore::new("sqlite::memory:").await.unwrap());
    let sessions: Arc<dyn SessionTokens> = Arc::new(JwtSessions::new(b"integration-secret", 24));
    let passwords = Arc::new(ArgonPasswords);

    let state = AppState {
        catalog: Arc::new(CatalogService::new(store.clone(), store.clone())),
        ratings: Arc::new(RatingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        comments: Arc::new(CommentService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        favorites: Arc::new(FavoriteService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        profile: Arc::new(ProfileService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        auth: Arc::new(AuthService::new(
            store.clone(),
            passwords,
            sessions.clone(),
        )),
        sessions,
        ip_hash_key: Arc::new(b"integration-ip-key".to_vec()),
        metrics: Arc::new(ApiMetrics::new()),
    };

    TestApp {
        router: router(state),
        store,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, body)
    }

    pub async fn seed_beer(&self, name: &str) -> Uuid {
        let beer = Beer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            brewery: "Fixture Brewing".into(),
            style: Some("ipa".into()),
            abv: Some(5.0),
            venue: None,
            lat: None,
            lng: None,
            description: Some("fixture".into()),
            rating: 0.0,
            rating_count: 0,
            created_at: Utc::now(),
        };
        self.store.create_beer(&beer).await.unwrap();
        beer.id
    }

    /// Registers via the API and logs in; returns the bearer token.
    pub async fn register_and_login(&self, username: &str) -> String {
        let (status, _, _) = self
            .send(post_json(
                "/api/auth/register",
                json!({ "username": username, "password": "hunter2hunter2" }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(username, "hunter2hunter2").await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, _, body) = self
            .send(post_json(
                "/api/auth/login",
                json!({ "username": username, "password": password }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    /// Inserts an admin directly at the store (registration never grants
    /// the role) and logs in through the API.
    pub async fn admin_token(&self) -> String {
        let admin = User {
            id: Uuid::new_v4(),
            username: "admin".into(),
            password_hash: ArgonPasswords.hash("admin-password-1").unwrap(),
            is_admin: true,
            avatar_url: None,
            created_at: Utc::now(),
        };
        self.store.create(&admin).await.unwrap();
        self.login("admin", "admin-password-1").await
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Attaches headers to an existing request.
pub fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    let value = format!("Bearer {token}").parse().unwrap();
    request.headers_mut().insert(AUTHORIZATION, value);
    request
}

pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(COOKIE, cookie.parse().unwrap());
    request
}

pub fn with_ip(mut request: Request<Body>, ip: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert("x-forwarded-for", ip.parse().unwrap());
    request
}

/// Extracts the `name=value` pair of the device cookie from a response.
pub fn device_cookie(headers: &HeaderMap) -> Option<String> {
    headers.get_all(SET_COOKIE).iter().find_map(|value| {
        let raw = value.to_str().ok()?;
        if raw.starts_with("blg_device=") {
            raw.split(';').next().map(String::from)
        } else {
            None
        }
    })
}
