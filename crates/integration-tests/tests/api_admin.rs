//! Admin catalog surface: role gating and CRUD.

mod support;

use axum::http::StatusCode;
use serde_json::json;

use support::*;

fn pils_payload() -> serde_json::Value {
    json!({
        "name": "Amtspils",
        "brewery": "Rathaus Brau",
        "style": "pilsner",
        "abv": 4.8,
        "venue": "Rathauskeller",
        "description": "Dry, grassy, properly bitter."
    })
}

#[tokio::test]
async fn the_admin_surface_is_role_gated() {
    let app = app().await;

    // Anonymous callers must log in.
    let (status, _, _) = app
        .send(post_json("/api/admin/beers", pils_payload()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Plain accounts are refused.
    let token = app.register_and_login("regular").await;
    let (status, _, _) = app
        .send(with_bearer(post_json("/api/admin/beers", pils_payload()), &token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_update_delete_round_trip() {
    let app = app().await;
    let admin = app.admin_token().await;

    let (status, _, created) = app
        .send(with_bearer(post_json("/api/admin/beers", pils_payload()), &admin))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["ratingCount"].as_i64(), Some(0));

    // Public detail sees it immediately.
    let (status, _, public) = app.send(get(&format!("/api/beers/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["name"].as_str(), Some("Amtspils"));

    let mut updated = pils_payload();
    updated["name"] = json!("Amtspils Export");
    let (status, _, body) = app
        .send(with_bearer(
            put_json(&format!("/api/admin/beers/{id}"), updated),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"].as_str(), Some("Amtspils Export"));

    let (status, _, _) = app
        .send(with_bearer(delete(&format!("/api/admin/beers/{id}")), &admin))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = app.send(get(&format!("/api/beers/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_payloads_are_validation_errors() {
    let app = app().await;
    let admin = app.admin_token().await;
    let (status, _, _) = app
        .send(with_bearer(
            post_json("/api/admin/beers", json!({ "name": " ", "brewery": "x" })),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
