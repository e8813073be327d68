//! # Comment tree
//!
//! Threaded comments per beer with a single nesting level. Deletion is a
//! soft delete: the stored body is scrubbed and the comment disappears from
//! every listing. Guests keep a time-boxed removal window bound to the
//! submitting IP fingerprint.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use domains::{
    ActivityEntry, ActivityKind, ActivityLog, Actor, ActorContext, AppError, CatalogRepo, Comment,
    CommentAuthor, CommentBody, CommentRepo, CommentWithMeta, Result, UserRepo,
};

pub const MAX_BODY_CHARS: usize = 1000;
pub const MAX_GUEST_NAME_CHARS: usize = 60;
const DEFAULT_PAGE: i64 = 20;
const MAX_PAGE: i64 = 100;
/// How long a guest may remove their own comment, measured from creation.
const GUEST_REMOVAL_WINDOW_HOURS: i64 = 24;

/// Input for creating a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    /// Guest display name; ignored for authenticated authors.
    pub display_name: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// What listings return: an active comment with display data, the viewer's
/// removal right, and nested replies. Serializes in the wire casing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub body: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// The author's current score for this beer, when they rated it.
    pub rating: Option<i64>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub can_delete: bool,
    pub replies: Vec<CommentView>,
}

pub struct CommentService {
    beers: Arc<dyn CatalogRepo>,
    comments: Arc<dyn CommentRepo>,
    users: Arc<dyn UserRepo>,
    activity: Arc<dyn ActivityLog>,
}

/// Pagination clamp: non-positive `take` falls back to the default, large
/// `take` is clamped, negative `skip` becomes zero. Never rejects.
pub(crate) fn clamp_page(skip: i64, take: i64, default: i64, max: i64) -> (i64, i64) {
    let take = if take <= 0 { default } else { take.min(max) };
    (skip.max(0), take)
}

/// Whether `ctx` may soft-delete `comment` at `now`.
fn may_remove(comment: &Comment, ctx: &ActorContext, now: DateTime<Utc>) -> bool {
    if ctx.actor.is_admin() {
        return true;
    }
    match &comment.author {
        CommentAuthor::User { id } => ctx.actor.user_id() == Some(*id),
        CommentAuthor::Guest { ip_hash, .. } => {
            let within_window =
                now - comment.created_at < Duration::hours(GUEST_REMOVAL_WINDOW_HOURS);
            match (ip_hash, &ctx.ip_hash) {
                (Some(original), Some(current)) => within_window && original == current,
                _ => false,
            }
        }
    }
}

impl CommentService {
    pub fn new(
        beers: Arc<dyn CatalogRepo>,
        comments: Arc<dyn CommentRepo>,
        users: Arc<dyn UserRepo>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            beers,
            comments,
            users,
            activity,
        }
    }

    pub async fn create(
        &self,
        beer_id: Uuid,
        input: NewComment,
        ctx: &ActorContext,
    ) -> Result<CommentView> {
        let body = input.body.trim().to_string();
        if body.is_empty() {
            return Err(AppError::validation("comment body must not be empty"));
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(AppError::validation(format!(
                "comment body exceeds {MAX_BODY_CHARS} characters"
            )));
        }

        self.beers
            .get_beer(beer_id)
            .await?
            .ok_or_else(|| AppError::not_found("beer", beer_id))?;

        if let Some(parent_id) = input.parent_id {
            let parent = self
                .comments
                .get(parent_id)
                .await?
                .ok_or_else(|| AppError::not_found("comment", parent_id))?;
            if parent.beer_id != beer_id {
                return Err(AppError::validation(
                    "parent comment belongs to a different beer",
                ));
            }
            if parent.body.is_deleted() {
                return Err(AppError::not_found("comment", parent_id));
            }
            if parent.parent_id.is_some() {
                return Err(AppError::validation("replies cannot be nested further"));
            }
        }

        let author = match ctx.actor {
            Actor::User { id, .. } => CommentAuthor::User { id },
            Actor::Device { id } => {
                let display_name = input
                    .display_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or("Guest")
                    .to_string();
                if display_name.chars().count() > MAX_GUEST_NAME_CHARS {
                    return Err(AppError::validation(format!(
                        "display name exceeds {MAX_GUEST_NAME_CHARS} characters"
                    )));
                }
                CommentAuthor::Guest {
                    display_name,
                    device_id: Some(id),
                    ip_hash: ctx.ip_hash.clone(),
                }
            }
        };

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            beer_id,
            parent_id: input.parent_id,
            author: author.clone(),
            body: CommentBody::Active { body: body.clone() },
            created_at: now,
        };
        self.comments.insert(&comment).await?;

        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            user_id: ctx.actor.user_id(),
            device_id: ctx.actor.device_id(),
            kind: ActivityKind::CommentAdded,
            subject_type: "beer".into(),
            subject_id: Some(beer_id),
            message: format!("commented ({} chars)", body.chars().count()),
            metadata: json!({ "comment_id": comment.id }),
            ip_hash: ctx.ip_hash.clone(),
            user_agent: ctx.user_agent.clone(),
            created_at: now,
        };
        if let Err(err) = self.activity.append(&entry).await {
            warn!(%err, comment_id = %comment.id, "failed to append comment activity");
        }

        // Resolve display data for the response without re-reading the page.
        let (display_name, avatar_url) = match &author {
            CommentAuthor::User { id } => match self.users.by_id(*id).await? {
                Some(user) => (user.username, user.avatar_url),
                None => ("unknown".to_string(), None),
            },
            CommentAuthor::Guest { display_name, .. } => (display_name.clone(), None),
        };
        Ok(self.view_of(
            CommentWithMeta {
                comment,
                display_name,
                avatar_url,
                rating: None,
            },
            ctx,
            now,
        ))
    }

    /// Soft-deletes a comment under the §authorization rules.
    pub async fn remove(&self, beer_id: Uuid, comment_id: Uuid, ctx: &ActorContext) -> Result<()> {
        let comment = self
            .comments
            .get(comment_id)
            .await?
            .filter(|c| c.beer_id == beer_id)
            .ok_or_else(|| AppError::not_found("comment", comment_id))?;
        if comment.body.is_deleted() {
            return Err(AppError::not_found("comment", comment_id));
        }

        let now = Utc::now();
        if !may_remove(&comment, ctx, now) {
            // Anonymous caller on an account-owned comment should log in;
            // everyone else is plainly refused.
            return match (&comment.author, &ctx.actor) {
                (CommentAuthor::User { .. }, Actor::Device { .. }) => Err(
                    AppError::Unauthenticated("log in to remove this comment".into()),
                ),
                _ => Err(AppError::Forbidden(
                    "not allowed to remove this comment".into(),
                )),
            };
        }

        self.comments.soft_delete(comment_id).await?;

        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            user_id: ctx.actor.user_id(),
            device_id: ctx.actor.device_id(),
            kind: ActivityKind::CommentRemoved,
            subject_type: "comment".into(),
            subject_id: Some(comment_id),
            message: "removed a comment".into(),
            metadata: json!({ "beer_id": beer_id }),
            ip_hash: ctx.ip_hash.clone(),
            user_agent: ctx.user_agent.clone(),
            created_at: now,
        };
        if let Err(err) = self.activity.append(&entry).await {
            warn!(%err, %comment_id, "failed to append removal activity");
        }
        Ok(())
    }

    /// Top-level comments newest first with their replies oldest first.
    pub async fn list(
        &self,
        beer_id: Uuid,
        skip: i64,
        take: i64,
        ctx: &ActorContext,
    ) -> Result<Vec<CommentView>> {
        self.beers
            .get_beer(beer_id)
            .await?
            .ok_or_else(|| AppError::not_found("beer", beer_id))?;

        let (skip, take) = clamp_page(skip, take, DEFAULT_PAGE, MAX_PAGE);
        let tops = self.comments.list_top_level(beer_id, skip, take).await?;
        let parent_ids: Vec<Uuid> = tops.iter().map(|row| row.comment.id).collect();
        let replies = if parent_ids.is_empty() {
            Vec::new()
        } else {
            self.comments.list_replies(&parent_ids).await?
        };

        let now = Utc::now();
        let mut views: Vec<CommentView> = tops
            .into_iter()
            .map(|row| self.view_of(row, ctx, now))
            .collect();
        for reply in replies {
            let parent_id = reply.comment.parent_id;
            let view = self.view_of(reply, ctx, now);
            if let Some(parent) = views.iter_mut().find(|v| Some(v.id) == parent_id) {
                parent.replies.push(view);
            }
        }
        Ok(views)
    }

    fn view_of(&self, row: CommentWithMeta, ctx: &ActorContext, now: DateTime<Utc>) -> CommentView {
        let can_delete = may_remove(&row.comment, ctx, now);
        let body = match row.comment.body {
            CommentBody::Active { ref body } => body.clone(),
            // Listings exclude deleted rows; defensive empty body otherwise.
            CommentBody::Deleted => String::new(),
        };
        CommentView {
            id: row.comment.id,
            body,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            rating: row.rating,
            parent_id: row.comment.parent_id,
            created_at: row.comment.created_at,
            can_delete,
            replies: Vec::new(),
        }
    }
}
