//! # Favorites
//!
//! (user, beer) pairs, authenticated only. Both directions of the toggle
//! are idempotent: repeating a POST or DELETE succeeds and leaves exactly
//! the state it names.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use domains::{
    ActivityEntry, ActivityKind, ActivityLog, ActorContext, AppError, Beer, CatalogRepo,
    FavoriteRepo, Result,
};

pub struct FavoriteService {
    beers: Arc<dyn CatalogRepo>,
    favorites: Arc<dyn FavoriteRepo>,
    activity: Arc<dyn ActivityLog>,
}

impl FavoriteService {
    pub fn new(
        beers: Arc<dyn CatalogRepo>,
        favorites: Arc<dyn FavoriteRepo>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            beers,
            favorites,
            activity,
        }
    }

    fn require_user(ctx: &ActorContext) -> Result<Uuid> {
        ctx.actor
            .user_id()
            .ok_or_else(|| AppError::Unauthenticated("favorites require a session".into()))
    }

    /// Sets the favorite state; returns the resulting state. Repeats are
    /// no-ops that still succeed.
    pub async fn set(&self, beer_id: Uuid, on: bool, ctx: &ActorContext) -> Result<bool> {
        let user_id = Self::require_user(ctx)?;
        self.beers
            .get_beer(beer_id)
            .await?
            .ok_or_else(|| AppError::not_found("beer", beer_id))?;

        let changed = if on {
            self.favorites.add(user_id, beer_id).await?
        } else {
            self.favorites.remove(user_id, beer_id).await?
        };

        if changed {
            let entry = ActivityEntry {
                id: Uuid::new_v4(),
                user_id: Some(user_id),
                device_id: None,
                kind: if on {
                    ActivityKind::FavoriteOn
                } else {
                    ActivityKind::FavoriteOff
                },
                subject_type: "beer".into(),
                subject_id: Some(beer_id),
                message: if on {
                    "added a favorite".into()
                } else {
                    "removed a favorite".into()
                },
                metadata: json!({}),
                ip_hash: ctx.ip_hash.clone(),
                user_agent: ctx.user_agent.clone(),
                created_at: Utc::now(),
            };
            if let Err(err) = self.activity.append(&entry).await {
                warn!(%err, %beer_id, "failed to append favorite activity");
            }
        }
        Ok(on)
    }

    pub async fn status(&self, beer_id: Uuid, ctx: &ActorContext) -> Result<bool> {
        let user_id = Self::require_user(ctx)?;
        self.beers
            .get_beer(beer_id)
            .await?
            .ok_or_else(|| AppError::not_found("beer", beer_id))?;
        self.favorites.exists(user_id, beer_id).await
    }

    pub async fn list(&self, ctx: &ActorContext) -> Result<Vec<Beer>> {
        let user_id = Self::require_user(ctx)?;
        self.favorites.list_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{Actor, MockActivityLog, MockCatalogRepo, MockFavoriteRepo};

    fn beer(id: Uuid) -> Beer {
        Beer {
            id,
            name: "Keller".into(),
            brewery: "Hilltop".into(),
            style: None,
            abv: None,
            venue: None,
            lat: None,
            lng: None,
            description: None,
            rating: 0.0,
            rating_count: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn anonymous_actors_cannot_favorite() {
        let svc = FavoriteService::new(
            Arc::new(MockCatalogRepo::new()),
            Arc::new(MockFavoriteRepo::new()),
            Arc::new(MockActivityLog::new()),
        );
        let ctx = ActorContext::new(Actor::Device { id: Uuid::new_v4() });
        let err = svc.set(Uuid::new_v4(), true, &ctx).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn repeat_toggle_on_is_silent() {
        let mut beers = MockCatalogRepo::new();
        beers
            .expect_get_beer()
            .returning(move |id| Ok(Some(beer(id))));
        let mut favorites = MockFavoriteRepo::new();
        // Second POST: the row already exists, nothing changes, still ok.
        favorites.expect_add().returning(|_, _| Ok(false));
        let mut log = MockActivityLog::new();
        log.expect_append().times(0);

        let svc = FavoriteService::new(Arc::new(beers), Arc::new(favorites), Arc::new(log));
        let ctx = ActorContext::new(Actor::User {
            id: Uuid::new_v4(),
            admin: false,
        });
        assert!(svc.set(Uuid::new_v4(), true, &ctx).await.unwrap());
    }
}
