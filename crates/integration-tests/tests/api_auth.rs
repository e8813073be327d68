//! Account registration and login.

mod support;

use axum::http::StatusCode;
use serde_json::json;

use support::*;

#[tokio::test]
async fn register_then_login() {
    let app = app().await;

    let (status, _, body) = app
        .send(post_json(
            "/api/auth/register",
            json!({ "username": "braumeister", "password": "quite-secret-9" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"].as_str(), Some("braumeister"));
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());

    let (status, _, body) = app
        .send(post_json(
            "/api/auth/login",
            json!({ "username": "braumeister", "password": "quite-secret-9" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_usernames_conflict() {
    let app = app().await;
    app.register_and_login("unique_snowflake").await;
    let (status, _, _) = app
        .send(post_json(
            "/api/auth/register",
            json!({ "username": "unique_snowflake", "password": "another-pass-1" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_validation() {
    let app = app().await;
    for (username, password) in [
        ("ab", "long-enough-pass"),
        ("has spaces", "long-enough-pass"),
        ("fine_name", "short"),
    ] {
        let (status, _, _) = app
            .send(post_json(
                "/api/auth/register",
                json!({ "username": username, "password": password }),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{username}/{password}");
    }
}

#[tokio::test]
async fn wrong_credentials_are_unauthenticated() {
    let app = app().await;
    app.register_and_login("cautious").await;

    let (status, _, _) = app
        .send(post_json(
            "/api/auth/login",
            json!({ "username": "cautious", "password": "wrong-password" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = app
        .send(post_json(
            "/api/auth/login",
            json!({ "username": "nobody", "password": "wrong-password" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_bearer_tokens_are_rejected() {
    let app = app().await;
    let (status, _, _) = app
        .send(with_bearer(get("/api/me/profile"), "not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
