//! # Profile: identity merge and engagement counters
//!
//! Loading a profile does three things: folds the request's anonymous
//! device activity into the account (exactly once), recounts the cached
//! engagement counters from the source ledgers, and returns the view.
//! The merge is best-effort — a transient persistence failure is logged
//! and must not block profile rendering.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use domains::{
    ActivityEntry, ActivityLog, ActorContext, AppError, CatalogRepo, CommentRepo,
    EngagementCounters, FavoriteRepo, RatingRepo, Result, UserRepo,
};

use crate::comments::clamp_page;
use crate::ratings::refresh_aggregate;

const DEFAULT_FEED: i64 = 20;
const MAX_FEED: i64 = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub counters: EngagementCounters,
}

pub struct ProfileService {
    users: Arc<dyn UserRepo>,
    beers: Arc<dyn CatalogRepo>,
    ratings: Arc<dyn RatingRepo>,
    comments: Arc<dyn CommentRepo>,
    favorites: Arc<dyn FavoriteRepo>,
    activity: Arc<dyn ActivityLog>,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        beers: Arc<dyn CatalogRepo>,
        ratings: Arc<dyn RatingRepo>,
        comments: Arc<dyn CommentRepo>,
        favorites: Arc<dyn FavoriteRepo>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            users,
            beers,
            ratings,
            comments,
            favorites,
            activity,
        }
    }

    /// Loads the current user's profile, merging device activity first and
    /// self-healing the counter cache.
    pub async fn load(&self, ctx: &ActorContext) -> Result<ProfileView> {
        let user_id = ctx
            .actor
            .user_id()
            .ok_or_else(|| AppError::Unauthenticated("profile requires a session".into()))?;
        let user = self
            .users
            .by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user", user_id))?;

        if let Some(device_id) = ctx.companion_device {
            if let Err(err) = self.merge_device(user_id, device_id).await {
                warn!(%err, %user_id, %device_id, "device merge failed; serving profile anyway");
            }
        }

        let counters = self.refresh_counters(user_id, ctx.companion_device).await?;
        Ok(ProfileView {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            counters,
        })
    }

    /// Reassigns rating rows owned by `device_id` to `user_id`. Idempotent:
    /// reassigned rows stop matching the unmerged query. When the user
    /// already rated the same beer, the authenticated row survives and the
    /// anonymous orphan is dropped, so the uniqueness invariant holds and
    /// nothing is counted twice.
    pub async fn merge_device(&self, user_id: Uuid, device_id: Uuid) -> Result<()> {
        let orphans = self.ratings.unmerged_for_device(device_id).await?;
        let mut dropped_beers = Vec::new();
        for orphan in orphans {
            match self.ratings.find_for_user(orphan.beer_id, user_id).await? {
                Some(_) => {
                    self.ratings.delete(orphan.id).await?;
                    dropped_beers.push(orphan.beer_id);
                }
                None => {
                    self.ratings.assign_user(orphan.id, user_id).await?;
                }
            }
        }
        // A dropped orphan shrinks the ledger; the beer aggregate must follow.
        for beer_id in dropped_beers {
            refresh_aggregate(self.ratings.as_ref(), self.beers.as_ref(), beer_id).await?;
        }
        Ok(())
    }

    /// Recomputes the engagement counters from the ledgers and overwrites
    /// the cache only when it drifted. Reviews include rows still owned by
    /// the user's unmerged device.
    pub async fn refresh_counters(
        &self,
        user_id: Uuid,
        device_id: Option<Uuid>,
    ) -> Result<EngagementCounters> {
        let mut reviews = self.ratings.count_for_user(user_id).await?;
        if let Some(device_id) = device_id {
            reviews += self.ratings.count_unmerged_for_device(device_id).await?;
        }
        let fresh = EngagementCounters {
            reviews,
            comments: self.comments.count_active_for_user(user_id).await?,
            favorites: self.favorites.count_for_user(user_id).await?,
        };
        if self.users.counters(user_id).await? != Some(fresh) {
            self.users.store_counters(user_id, &fresh).await?;
        }
        Ok(fresh)
    }

    /// The merged recent-activity feed for the current user.
    pub async fn activities(&self, ctx: &ActorContext, take: i64) -> Result<Vec<ActivityEntry>> {
        let user_id = ctx
            .actor
            .user_id()
            .ok_or_else(|| AppError::Unauthenticated("activity feed requires a session".into()))?;
        let (_, take) = clamp_page(0, take, DEFAULT_FEED, MAX_FEED);
        self.activity
            .recent(user_id, ctx.companion_device, take)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{
        MockActivityLog, MockCatalogRepo, MockCommentRepo, MockFavoriteRepo, MockRatingRepo,
        MockUserRepo, RatingRecord,
    };

    fn orphan(beer_id: Uuid, device: Uuid) -> RatingRecord {
        RatingRecord {
            id: Uuid::new_v4(),
            beer_id,
            user_id: None,
            device_id: Some(device),
            ip_hash: None,
            score: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(
        users: MockUserRepo,
        beers: MockCatalogRepo,
        ratings: MockRatingRepo,
        comments: MockCommentRepo,
        favorites: MockFavoriteRepo,
    ) -> ProfileService {
        ProfileService::new(
            Arc::new(users),
            Arc::new(beers),
            Arc::new(ratings),
            Arc::new(comments),
            Arc::new(favorites),
            Arc::new(MockActivityLog::new()),
        )
    }

    #[tokio::test]
    async fn merge_reassigns_non_colliding_rows() {
        let user_id = Uuid::new_v4();
        let device = Uuid::new_v4();
        let row = orphan(Uuid::new_v4(), device);
        let row_id = row.id;

        let mut ratings = MockRatingRepo::new();
        ratings
            .expect_unmerged_for_device()
            .returning(move |_| Ok(vec![row.clone()]));
        ratings.expect_find_for_user().returning(|_, _| Ok(None));
        ratings
            .expect_assign_user()
            .withf(move |id, uid| *id == row_id && *uid == user_id)
            .times(1)
            .returning(|_, _| Ok(()));
        ratings.expect_delete().times(0);

        let svc = service(
            MockUserRepo::new(),
            MockCatalogRepo::new(),
            ratings,
            MockCommentRepo::new(),
            MockFavoriteRepo::new(),
        );
        svc.merge_device(user_id, device).await.unwrap();
    }

    #[tokio::test]
    async fn merge_drops_orphan_on_collision_and_recomputes() {
        let user_id = Uuid::new_v4();
        let device = Uuid::new_v4();
        let beer_id = Uuid::new_v4();
        let row = orphan(beer_id, device);
        let row_id = row.id;
        let authed = RatingRecord {
            user_id: Some(user_id),
            device_id: None,
            ..orphan(beer_id, device)
        };

        let mut ratings = MockRatingRepo::new();
        ratings
            .expect_unmerged_for_device()
            .returning(move |_| Ok(vec![row.clone()]));
        ratings
            .expect_find_for_user()
            .returning(move |_, _| Ok(Some(authed.clone())));
        ratings
            .expect_delete()
            .withf(move |id| *id == row_id)
            .times(1)
            .returning(|_| Ok(()));
        ratings.expect_assign_user().times(0);
        ratings.expect_aggregate().returning(|_| Ok((1, 5)));

        let mut beers = MockCatalogRepo::new();
        beers
            .expect_set_rating_aggregate()
            .withf(move |id, avg, count| *id == beer_id && *avg == 5.0 && *count == 1)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = service(
            MockUserRepo::new(),
            beers,
            ratings,
            MockCommentRepo::new(),
            MockFavoriteRepo::new(),
        );
        svc.merge_device(user_id, device).await.unwrap();
    }

    #[tokio::test]
    async fn recount_overwrites_only_on_drift() {
        let user_id = Uuid::new_v4();

        let mut ratings = MockRatingRepo::new();
        ratings.expect_count_for_user().returning(|_| Ok(3));
        let mut comments = MockCommentRepo::new();
        comments.expect_count_active_for_user().returning(|_| Ok(2));
        let mut favorites = MockFavoriteRepo::new();
        favorites.expect_count_for_user().returning(|_| Ok(1));

        let mut users = MockUserRepo::new();
        users.expect_counters().returning(|_| {
            Ok(Some(EngagementCounters {
                reviews: 3,
                comments: 2,
                favorites: 1,
            }))
        });
        // Cache already matches: no write.
        users.expect_store_counters().times(0);

        let svc = service(
            users,
            MockCatalogRepo::new(),
            ratings,
            comments,
            favorites,
        );
        let counters = svc.refresh_counters(user_id, None).await.unwrap();
        assert_eq!(counters.reviews, 3);
    }

    #[tokio::test]
    async fn recount_includes_unmerged_device_reviews() {
        let user_id = Uuid::new_v4();
        let device = Uuid::new_v4();

        let mut ratings = MockRatingRepo::new();
        ratings.expect_count_for_user().returning(|_| Ok(2));
        ratings
            .expect_count_unmerged_for_device()
            .returning(|_| Ok(1));
        let mut comments = MockCommentRepo::new();
        comments.expect_count_active_for_user().returning(|_| Ok(0));
        let mut favorites = MockFavoriteRepo::new();
        favorites.expect_count_for_user().returning(|_| Ok(0));

        let mut users = MockUserRepo::new();
        users.expect_counters().returning(|_| Ok(None));
        users
            .expect_store_counters()
            .withf(|_, counters| counters.reviews == 3)
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(
            users,
            MockCatalogRepo::new(),
            ratings,
            comments,
            favorites,
        );
        let counters = svc.refresh_counters(user_id, Some(device)).await.unwrap();
        assert_eq!(counters.reviews, 3);
    }
}
