//! # brewlog binary
//!
//! Assembles the adapters around the domain services and serves the API.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use api_adapters::metrics::ApiMetrics;
use api_adapters::{router, AppState};
use auth_adapters::{ArgonPasswords, JwtSessions};
use configs::AppConfig;
use domains::SessionTokens;
use services::{
    AuthService, CatalogService, CommentService, FavoriteService, ProfileService, RatingService,
};

#[cfg(feature = "db-sqlite")]
use storage_adapters::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    #[cfg(feature = "db-sqlite")]
    let store = Arc::new(
        SqliteStore::new(&config.database.url)
            .await
            .context("initializing the database")?,
    );

    let sessions: Arc<dyn SessionTokens> = Arc::new(JwtSessions::new(
        config.auth.jwt_secret.expose_secret().as_bytes(),
        config.auth.token_ttl_hours,
    ));
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
        ip_hash_key: Arc::new(
            config
                .auth
                .ip_hash_key
                .expose_secret()
                .as_bytes()
                .to_vec(),
        ),
        metrics: Arc::new(ApiMetrics::new()),
    };

    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "brewlog listening");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
