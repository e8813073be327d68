//! Route table and middleware stack.

use axum::routing::{delete, get, post, put};
use axum::{middleware as axum_middleware, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::device_cookie_layer;
use crate::state::AppState;

/// Builds the application router. Mounted at the root so the binary can
/// nest it under a prefix if it ever needs to.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Accounts
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        // Catalog
        .route("/api/beers", get(handlers::beers::list))
        .route("/api/beers/{id}", get(handlers::beers::get))
        .route("/api/beers/{id}/similar", get(handlers::beers::similar))
        // Quick ratings
        .route("/api/ratings/quick", post(handlers::ratings::submit_quick))
        .route("/api/ratings/quick/mine", get(handlers::ratings::my_quick))
        // Comments
        .route(
            "/api/beers/{id}/comments",
            get(handlers::comments::list).post(handlers::comments::create),
        )
        .route(
            "/api/beers/{id}/comments/{comment_id}",
            delete(handlers::comments::remove),
        )
        // Favorites
        .route(
            "/api/beers/{id}/favorite",
            get(handlers::favorites::status)
                .post(handlers::favorites::add)
                .delete(handlers::favorites::remove),
        )
        .route("/api/me/favorites", get(handlers::favorites::mine))
        // Profile
        .route("/api/me/profile", get(handlers::profile::me))
        .route("/api/me/activities", get(handlers::profile::activities))
        // Admin
        .route("/api/admin/beers", post(handlers::admin::create_beer))
        .route(
            "/api/admin/beers/{id}",
            put(handlers::admin::update_beer).delete(handlers::admin::delete_beer),
        )
        .layer(axum_middleware::from_fn(device_cookie_layer))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}
