//! Shared application state for the axum router.

use std::sync::Arc;

use domains::SessionTokens;
use services::{
    AuthService, CatalogService, CommentService, FavoriteService, ProfileService, RatingService,
};

use crate::metrics::ApiMetrics;

/// Cloned per request by axum; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub ratings: Arc<RatingService>,
    pub comments: Arc<CommentService>,
    pub favorites: Arc<FavoriteService>,
    pub profile: Arc<ProfileService>,
    pub auth: Arc<AuthService>,
    pub sessions: Arc<dyn SessionTokens>,
    /// Key for the forensic IP fingerprint.
    pub ip_hash_key: Arc<Vec<u8>>,
    pub metrics: Arc<ApiMetrics>,
}
