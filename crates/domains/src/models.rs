//! # Domain Models
//!
//! These structs represent the core entities of brewlog.
//! UUIDs are used for globally unique identification across adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Actor;

/// A rateable, commentable beverage record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beer {
    pub id: Uuid,
    pub name: String,
    pub brewery: String,
    pub style: Option<String>,
    /// Alcohol by volume, percent.
    pub abv: Option<f64>,
    /// Where the beer is poured (bar, taproom, shop).
    pub venue: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
    /// Arithmetic mean of all live rating scores, rounded to 2 decimals.
    /// Derived — recomputed from the rating ledger, never trusted alone.
    pub rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One evaluation of a beer by one actor. At most one row exists per
/// (beer, resolved actor); re-rating updates the row in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecord {
    pub id: Uuid,
    pub beer_id: Uuid,
    /// Owning user, once the actor is (or has been merged into) an account.
    pub user_id: Option<Uuid>,
    /// Anonymous device identifier; kept for audit after a merge.
    pub device_id: Option<Uuid>,
    /// Forensic IP fingerprint. Only an ownership key for legacy rows that
    /// carry no device id.
    pub ip_hash: Option<String>,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RatingRecord {
    /// Whether `actor` owns this row under the unified identity semantics:
    /// the user id when populated, the device id otherwise.
    pub fn owned_by(&self, actor: &Actor) -> bool {
        match actor {
            Actor::User { id, .. } => self.user_id == Some(*id),
            Actor::Device { id } => self.user_id.is_none() && self.device_id == Some(*id),
        }
    }
}

/// Displayed aggregate for a beer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub avg: f64,
    pub count: i64,
}

/// Comment content. Deletion is terminal and discards the original text,
/// which the type makes impossible to ignore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CommentBody {
    Active { body: String },
    Deleted,
}

impl CommentBody {
    pub fn is_deleted(&self) -> bool {
        matches!(self, CommentBody::Deleted)
    }
}

/// Who wrote a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommentAuthor {
    User { id: Uuid },
    Guest {
        display_name: String,
        device_id: Option<Uuid>,
        /// Fingerprint of the submitting IP; gates the guest removal window.
        ip_hash: Option<String>,
    },
}

/// A message attached to a beer, optionally replying to a top-level comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub beer_id: Uuid,
    /// Single nesting level: a parent is always itself top-level.
    pub parent_id: Option<Uuid>,
    pub author: CommentAuthor,
    pub body: CommentBody,
    pub created_at: DateTime<Utc>,
}

/// Listing row: a comment joined with display data the views need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithMeta {
    pub comment: Comment,
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// The author's current score for this beer, when they rated it.
    pub rating: Option<i64>,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string; never serialized to clients by the API layer.
    pub password_hash: String,
    pub is_admin: bool,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Cached per-user aggregate counts. A materialized, self-healing cache —
/// overwritten from a full recount, never incremented in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounters {
    pub reviews: i64,
    pub comments: i64,
    pub favorites: i64,
}

/// Category of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    RatingSet,
    CommentAdded,
    CommentRemoved,
    FavoriteOn,
    FavoriteOff,
    ProfileEdited,
    AdminAction,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::RatingSet => "rating_set",
            ActivityKind::CommentAdded => "comment_added",
            ActivityKind::CommentRemoved => "comment_removed",
            ActivityKind::FavoriteOn => "favorite_on",
            ActivityKind::FavoriteOff => "favorite_off",
            ActivityKind::ProfileEdited => "profile_edited",
            ActivityKind::AdminAction => "admin_action",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "rating_set" => Some(Self::RatingSet),
            "comment_added" => Some(Self::CommentAdded),
            "comment_removed" => Some(Self::CommentRemoved),
            "favorite_on" => Some(Self::FavoriteOn),
            "favorite_off" => Some(Self::FavoriteOff),
            "profile_edited" => Some(Self::ProfileEdited),
            "admin_action" => Some(Self::AdminAction),
            _ => None,
        }
    }
}

/// Append-only audit record. Never mutated or deleted by normal flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub device_id: Option<Uuid>,
    pub kind: ActivityKind,
    /// Subject of the action, e.g. ("beer", <id>) or ("comment", <id>).
    pub subject_type: String,
    pub subject_id: Option<Uuid>,
    pub message: String,
    pub metadata: serde_json::Value,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
