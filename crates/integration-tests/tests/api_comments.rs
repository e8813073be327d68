//! Comment tree: creation rules, threading, pagination clamps and the
//! soft-delete authorization matrix.

mod support;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use support::*;

fn comments_uri(beer: Uuid) -> String {
    format!("/api/beers/{beer}/comments")
}

#[tokio::test]
async fn guest_comment_round_trip() {
    let app = app().await;
    let beer = app.seed_beer("Chatty Saison").await;

    let (status, _, created) = app
        .send(with_ip(
            post_json(
                &comments_uri(beer),
                json!({ "body": "bright and peppery", "displayName": "Hopfen" }),
            ),
            "192.0.2.1",
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["displayName"].as_str(), Some("Hopfen"));
    assert_eq!(created["body"].as_str(), Some("bright and peppery"));

    let (status, _, listing) = app
        .send(with_ip(get(&comments_uri(beer)), "192.0.2.1"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = listing.as_array().unwrap();
    assert_eq!(items.len(), 1);
    // Same submitting IP, still inside the removal window.
    assert_eq!(items[0]["canDelete"].as_bool(), Some(true));
}

#[tokio::test]
async fn body_validation() {
    let app = app().await;
    let beer = app.seed_beer("Strict Stout").await;

    let (status, _, _) = app
        .send(post_json(&comments_uri(beer), json!({ "body": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(post_json(
            &comments_uri(beer),
            json!({ "body": "x".repeat(1001) }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 1000 chars exactly is still fine.
    let (status, _, _) = app
        .send(post_json(
            &comments_uri(beer),
            json!({ "body": "x".repeat(1000) }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn reply_threading_rules() {
    let app = app().await;
    let beer = app.seed_beer("Thread Tripel").await;
    let other_beer = app.seed_beer("Other Tripel").await;

    let (_, _, top) = app
        .send(post_json(&comments_uri(beer), json!({ "body": "top" })))
        .await;
    let top_id = top["id"].as_str().unwrap().to_string();

    let (status, _, reply) = app
        .send(post_json(
            &comments_uri(beer),
            json!({ "body": "reply", "parentId": top_id }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let reply_id = reply["id"].as_str().unwrap().to_string();

    // One nesting level only.
    let (status, _, _) = app
        .send(post_json(
            &comments_uri(beer),
            json!({ "body": "reply to reply", "parentId": reply_id }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The parent must belong to the same beer.
    let (status, _, _) = app
        .send(post_json(
            &comments_uri(other_beer),
            json!({ "body": "cross-beer", "parentId": top_id }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing parent is 404.
    let (status, _, _) = app
        .send(post_json(
            &comments_uri(beer),
            json!({ "body": "orphan", "parentId": Uuid::new_v4() }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The listing nests the reply under its parent.
    let (_, _, listing) = app.send(get(&comments_uri(beer))).await;
    let items = listing.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["replies"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn pagination_clamps_instead_of_rejecting() {
    let app = app().await;
    let beer = app.seed_beer("Pagey Porter").await;
    for i in 0..3 {
        let (status, _, _) = app
            .send(post_json(&comments_uri(beer), json!({ "body": format!("c{i}") })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, body) = app
        .send(get(&format!("{}?take=2", comments_uri(beer))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // take=0 falls back to the default page size; huge takes are clamped,
    // negative skips are treated as zero. None of them are errors.
    for query in ["?take=0", "?take=100000", "?skip=-5&take=-1"] {
        let (status, _, body) = app
            .send(get(&format!("{}{query}", comments_uri(beer))))
            .await;
        assert_eq!(status, StatusCode::OK, "{query}");
        assert_eq!(body.as_array().unwrap().len(), 3, "{query}");
    }
}

#[tokio::test]
async fn guest_removal_is_ip_bound_and_admin_is_not() {
    let app = app().await;
    let beer = app.seed_beer("Mod Maibock").await;

    let (_, _, created) = app
        .send(with_ip(
            post_json(&comments_uri(beer), json!({ "body": "first" })),
            "198.51.100.7",
        ))
        .await;
    let first = created["id"].as_str().unwrap().to_string();

    // A different IP is refused.
    let (status, _, _) = app
        .send(with_ip(
            delete(&format!("{}/{first}", comments_uri(beer))),
            "198.51.100.8",
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The submitting IP may remove inside the window.
    let (status, _, _) = app
        .send(with_ip(
            delete(&format!("{}/{first}", comments_uri(beer))),
            "198.51.100.7",
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Gone from listings; deleting again is 404.
    let (_, _, listing) = app.send(get(&comments_uri(beer))).await;
    assert!(listing.as_array().unwrap().is_empty());
    let (status, _, _) = app
        .send(with_ip(
            delete(&format!("{}/{first}", comments_uri(beer))),
            "198.51.100.7",
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Admins remove anything, from anywhere.
    let (_, _, created) = app
        .send(with_ip(
            post_json(&comments_uri(beer), json!({ "body": "second" })),
            "198.51.100.9",
        ))
        .await;
    let second = created["id"].as_str().unwrap().to_string();
    let admin = app.admin_token().await;
    let (status, _, _) = app
        .send(with_bearer(
            delete(&format!("{}/{second}", comments_uri(beer))),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn account_owned_comments_follow_owner_rules() {
    let app = app().await;
    let beer = app.seed_beer("Owner Altbier").await;

    let owner = app.register_and_login("talker").await;
    let (_, _, created) = app
        .send(with_bearer(
            post_json(&comments_uri(beer), json!({ "body": "mine" })),
            &owner,
        ))
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    // An anonymous caller is told to log in.
    let (status, _, _) = app
        .send(delete(&format!("{}/{id}", comments_uri(beer))))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A different account is refused.
    let stranger = app.register_and_login("lurker").await;
    let (status, _, _) = app
        .send(with_bearer(
            delete(&format!("{}/{id}", comments_uri(beer))),
            &stranger,
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner may remove at any time.
    let (status, _, _) = app
        .send(with_bearer(
            delete(&format!("{}/{id}", comments_uri(beer))),
            &owner,
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
