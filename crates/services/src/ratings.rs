//! # Rating ledger
//!
//! One rating row per (beer, actor). Submission is an upsert: a second
//! submission from the same resolved actor changes the score but never the
//! count. The beer's displayed aggregate is always recomputed from the
//! ledger's sum and count, never from the previously rounded value.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use domains::{
    ActivityEntry, ActivityKind, ActivityLog, ActorContext, AppError, CatalogRepo, RatingRecord,
    RatingRepo, RatingSummary, Result,
};

/// Valid quick-rating scores, inclusive.
pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

pub struct RatingService {
    beers: Arc<dyn CatalogRepo>,
    ratings: Arc<dyn RatingRepo>,
    activity: Arc<dyn ActivityLog>,
}

/// Validates a raw JSON number as a score. Non-integers are rejected rather
/// than truncated; 1 and 5 are accepted, 0 and 6 are not.
pub fn coerce_score(raw: f64) -> Result<i64> {
    if !raw.is_finite() || raw.fract() != 0.0 {
        return Err(AppError::validation("score must be a whole number"));
    }
    let score = raw as i64;
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(AppError::validation(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}"
        )));
    }
    Ok(score)
}

/// Rounds to 2 decimal places for display/storage.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recomputes a beer's aggregate from the ledger and persists it.
/// Shared with the profile merge path, which also changes the ledger.
pub(crate) async fn refresh_aggregate(
    ratings: &dyn RatingRepo,
    beers: &dyn CatalogRepo,
    beer_id: Uuid,
) -> Result<RatingSummary> {
    let (count, sum) = ratings.aggregate(beer_id).await?;
    let avg = if count > 0 {
        round2(sum as f64 / count as f64)
    } else {
        0.0
    };
    beers.set_rating_aggregate(beer_id, avg, count).await?;
    Ok(RatingSummary { avg, count })
}

impl RatingService {
    pub fn new(
        beers: Arc<dyn CatalogRepo>,
        ratings: Arc<dyn RatingRepo>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            beers,
            ratings,
            activity,
        }
    }

    /// Sets the actor's rating for a beer and returns the fresh aggregate.
    pub async fn submit(
        &self,
        beer_id: Uuid,
        score: i64,
        ctx: &ActorContext,
    ) -> Result<RatingSummary> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(AppError::validation(format!(
                "score must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }
        let beer = self
            .beers
            .get_beer(beer_id)
            .await?
            .ok_or_else(|| AppError::not_found("beer", beer_id))?;

        let now = Utc::now();
        let existing = self
            .ratings
            .find_for_actor(beer_id, &ctx.actor, ctx.ip_hash.as_deref())
            .await?;

        match existing {
            Some(record) => {
                self.ratings.update_score(record.id, score, now).await?;
            }
            None => {
                let record = RatingRecord {
                    id: Uuid::new_v4(),
                    beer_id,
                    user_id: ctx.actor.user_id(),
                    device_id: ctx.actor.device_id(),
                    ip_hash: ctx.ip_hash.clone(),
                    score,
                    created_at: now,
                    updated_at: now,
                };
                match self.ratings.insert(&record).await {
                    Ok(()) => {}
                    // Two near-simultaneous first ratings from the same actor
                    // raced; the unique constraint is the signal to fall back
                    // to an update. Bounded to one retry.
                    Err(AppError::Conflict(_)) => {
                        let winner = self
                            .ratings
                            .find_for_actor(beer_id, &ctx.actor, ctx.ip_hash.as_deref())
                            .await?
                            .ok_or_else(|| {
                                AppError::Conflict("rating row vanished during upsert".into())
                            })?;
                        self.ratings.update_score(winner.id, score, now).await?;
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        let summary = refresh_aggregate(self.ratings.as_ref(), self.beers.as_ref(), beer_id).await?;

        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            user_id: ctx.actor.user_id(),
            device_id: ctx.actor.device_id(),
            kind: ActivityKind::RatingSet,
            subject_type: "beer".into(),
            subject_id: Some(beer_id),
            message: format!("rated {} {}/5", beer.name, score),
            metadata: json!({ "score": score }),
            ip_hash: ctx.ip_hash.clone(),
            user_agent: ctx.user_agent.clone(),
            created_at: now,
        };
        if let Err(err) = self.activity.append(&entry).await {
            warn!(%err, %beer_id, "failed to append rating activity");
        }

        Ok(summary)
    }

    /// The actor's current score for a beer, or `None`. No side effects.
    pub async fn my_rating(&self, beer_id: Uuid, ctx: &ActorContext) -> Result<Option<i64>> {
        Ok(self
            .ratings
            .find_for_actor(beer_id, &ctx.actor, ctx.ip_hash.as_deref())
            .await?
            .map(|record| record.score))
    }
}
