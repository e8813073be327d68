//! # Core Traits (Ports)
//!
//! Adapters must implement these traits to be wired into the binary.
//! Repositories return the domain `Result`; a uniqueness collision
//! surfaces as `AppError::Conflict` so services can resolve the race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::Result;
use crate::models::{
    ActivityEntry, Beer, Comment, CommentWithMeta, EngagementCounters, RatingRecord, User,
};

/// Catalog listing filter; `skip`/`take` are pre-clamped by the services.
#[derive(Debug, Clone, Default)]
pub struct BeerFilter {
    /// Case-insensitive substring over name and brewery.
    pub q: Option<String>,
    pub style: Option<String>,
    pub skip: i64,
    pub take: i64,
}

/// Persistence contract for the beer catalog.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CatalogRepo: Send + Sync {
    async fn get_beer(&self, id: Uuid) -> Result<Option<Beer>>;
    async fn list_beers(&self, filter: &BeerFilter) -> Result<Vec<Beer>>;
    async fn create_beer(&self, beer: &Beer) -> Result<()>;
    /// Full-row update; returns false when the beer does not exist.
    async fn update_beer(&self, beer: &Beer) -> Result<bool>;
    async fn delete_beer(&self, id: Uuid) -> Result<bool>;
    /// Persists a recomputed rating aggregate on the beer row.
    async fn set_rating_aggregate(&self, beer_id: Uuid, rating: f64, count: i64) -> Result<()>;
}

/// Persistence contract for the rating ledger.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RatingRepo: Send + Sync {
    /// Looks up the actor's row for a beer, matching whichever identity
    /// columns that actor populates. For anonymous actors, legacy rows
    /// with no device id are matched by `ip_hash` as a fallback.
    async fn find_for_actor(
        &self,
        beer_id: Uuid,
        actor: &Actor,
        ip_hash: Option<&str>,
    ) -> Result<Option<RatingRecord>>;
    async fn find_for_user(&self, beer_id: Uuid, user_id: Uuid) -> Result<Option<RatingRecord>>;
    /// Inserts a new row; `Conflict` on a (beer, actor) uniqueness violation.
    async fn insert(&self, record: &RatingRecord) -> Result<()>;
    async fn update_score(&self, id: Uuid, score: i64, at: DateTime<Utc>) -> Result<()>;
    /// (count, sum) over live rows for a beer.
    async fn aggregate(&self, beer_id: Uuid) -> Result<(i64, i64)>;
    /// Rows still owned by an anonymous device (no user id).
    async fn unmerged_for_device(&self, device_id: Uuid) -> Result<Vec<RatingRecord>>;
    /// Reassigns ownership to a user; the device id stays for audit.
    async fn assign_user(&self, id: Uuid, user_id: Uuid) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn count_for_user(&self, user_id: Uuid) -> Result<i64>;
    async fn count_unmerged_for_device(&self, device_id: Uuid) -> Result<i64>;
}

/// Persistence contract for comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn insert(&self, comment: &Comment) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Comment>>;
    /// Active top-level comments, newest first.
    async fn list_top_level(&self, beer_id: Uuid, skip: i64, take: i64)
        -> Result<Vec<CommentWithMeta>>;
    /// Active replies for a set of parents, oldest first.
    async fn list_replies(&self, parent_ids: &[Uuid]) -> Result<Vec<CommentWithMeta>>;
    /// Marks the comment deleted and scrubs the stored body.
    async fn soft_delete(&self, id: Uuid) -> Result<()>;
    async fn count_active_for_user(&self, user_id: Uuid) -> Result<i64>;
}

/// Persistence contract for favorites.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FavoriteRepo: Send + Sync {
    /// Returns false when the pair already existed (idempotent toggle-on).
    async fn add(&self, user_id: Uuid, beer_id: Uuid) -> Result<bool>;
    /// Returns false when there was nothing to remove.
    async fn remove(&self, user_id: Uuid, beer_id: Uuid) -> Result<bool>;
    async fn exists(&self, user_id: Uuid, beer_id: Uuid) -> Result<bool>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Beer>>;
    async fn count_for_user(&self, user_id: Uuid) -> Result<i64>;
}

/// Persistence contract for accounts and their cached counters.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// `Conflict` on a duplicate username.
    async fn create(&self, user: &User) -> Result<()>;
    async fn by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn by_username(&self, username: &str) -> Result<Option<User>>;
    async fn counters(&self, user_id: Uuid) -> Result<Option<EngagementCounters>>;
    async fn store_counters(&self, user_id: Uuid, counters: &EngagementCounters) -> Result<()>;
}

/// Append-only audit trail.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn append(&self, entry: &ActivityEntry) -> Result<()>;
    /// Recent entries attributed to a user and, optionally, their device.
    async fn recent(
        &self,
        user_id: Uuid,
        device_id: Option<Uuid>,
        take: i64,
    ) -> Result<Vec<ActivityEntry>>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Passwords: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String>;
    fn verify(&self, plain: &str, phc: &str) -> bool;
}

/// Decoded bearer-session claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub admin: bool,
}

/// Session token contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SessionTokens: Send + Sync {
    fn issue(&self, user: &User) -> Result<String>;
    fn decode(&self, token: &str) -> Result<SessionClaims>;
}
