//! # Catalog
//!
//! Public beer listing/detail, the admin CRUD surface, and the heuristic
//! "similar beers" scorer: token overlap over style/description/name plus
//! weighted rating and popularity terms. Linear scan, top-N — the catalog
//! is small by construction.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use domains::{
    ActivityEntry, ActivityKind, ActivityLog, ActorContext, AppError, Beer, BeerFilter,
    CatalogRepo, Result,
};

use crate::comments::clamp_page;

const DEFAULT_PAGE: i64 = 20;
const MAX_PAGE: i64 = 100;
/// Candidate pool scanned by the recommender.
const SIMILAR_SCAN: i64 = 500;
const DEFAULT_SIMILAR: i64 = 5;
const MAX_SIMILAR: i64 = 20;

/// Admin input for creating or replacing a beer.
#[derive(Debug, Clone)]
pub struct NewBeer {
    pub name: String,
    pub brewery: String,
    pub style: Option<String>,
    pub abv: Option<f64>,
    pub venue: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
}

pub struct CatalogService {
    beers: Arc<dyn CatalogRepo>,
    activity: Arc<dyn ActivityLog>,
}

fn tokens(beer: &Beer) -> HashSet<String> {
    let mut text = String::new();
    text.push_str(&beer.name);
    text.push(' ');
    if let Some(style) = &beer.style {
        text.push_str(style);
        text.push(' ');
    }
    if let Some(description) = &beer.description {
        text.push_str(description);
    }
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(String::from)
        .collect()
}

/// Ad hoc additive similarity: flavor-token overlap dominates, the
/// community rating and (log-damped) popularity break ties.
fn similarity(reference: &HashSet<String>, candidate: &Beer) -> f64 {
    let candidate_tokens = tokens(candidate);
    if reference.is_empty() || candidate_tokens.is_empty() {
        return 0.0;
    }
    let overlap = reference.intersection(&candidate_tokens).count() as f64;
    let normalized = overlap / reference.len().max(candidate_tokens.len()) as f64;
    normalized * 10.0 + candidate.rating * 0.5 + ((candidate.rating_count + 1) as f64).ln() * 0.2
}

impl CatalogService {
    pub fn new(beers: Arc<dyn CatalogRepo>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { beers, activity }
    }

    pub async fn list(
        &self,
        q: Option<String>,
        style: Option<String>,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Beer>> {
        let (skip, take) = clamp_page(skip, take, DEFAULT_PAGE, MAX_PAGE);
        let filter = BeerFilter {
            q: q.filter(|s| !s.trim().is_empty()),
            style: style.filter(|s| !s.trim().is_empty()),
            skip,
            take,
        };
        self.beers.list_beers(&filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Beer> {
        self.beers
            .get_beer(id)
            .await?
            .ok_or_else(|| AppError::not_found("beer", id))
    }

    /// Beers with the closest flavor profile to `id`, best first.
    pub async fn similar(&self, id: Uuid, take: i64) -> Result<Vec<Beer>> {
        let reference = self.get(id).await?;
        let reference_tokens = tokens(&reference);
        let take = if take <= 0 {
            DEFAULT_SIMILAR
        } else {
            take.min(MAX_SIMILAR)
        };

        let pool = self
            .beers
            .list_beers(&BeerFilter {
                skip: 0,
                take: SIMILAR_SCAN,
                ..BeerFilter::default()
            })
            .await?;

        let mut scored: Vec<(f64, Beer)> = pool
            .into_iter()
            .filter(|candidate| candidate.id != id)
            .map(|candidate| (similarity(&reference_tokens, &candidate), candidate))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(take as usize)
            .map(|(_, beer)| beer)
            .collect())
    }

    fn require_admin(ctx: &ActorContext) -> Result<Uuid> {
        let user_id = ctx
            .actor
            .user_id()
            .ok_or_else(|| AppError::Unauthenticated("admin surface requires a session".into()))?;
        if !ctx.actor.is_admin() {
            return Err(AppError::Forbidden("admin role required".into()));
        }
        Ok(user_id)
    }

    fn validate(input: &NewBeer) -> Result<()> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("beer name must not be empty"));
        }
        if input.brewery.trim().is_empty() {
            return Err(AppError::validation("brewery must not be empty"));
        }
        if let Some(abv) = input.abv {
            if !(0.0..=100.0).contains(&abv) {
                return Err(AppError::validation("abv must be a percentage"));
            }
        }
        Ok(())
    }

    pub async fn create(&self, input: NewBeer, ctx: &ActorContext) -> Result<Beer> {
        let admin_id = Self::require_admin(ctx)?;
        Self::validate(&input)?;
        let beer = Beer {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            brewery: input.brewery.trim().to_string(),
            style: input.style,
            abv: input.abv,
            venue: input.venue,
            lat: input.lat,
            lng: input.lng,
            description: input.description,
            rating: 0.0,
            rating_count: 0,
            created_at: Utc::now(),
        };
        self.beers.create_beer(&beer).await?;
        self.log_admin(ctx, admin_id, &beer.id, format!("created beer {}", beer.name))
            .await;
        Ok(beer)
    }

    pub async fn update(&self, id: Uuid, input: NewBeer, ctx: &ActorContext) -> Result<Beer> {
        let admin_id = Self::require_admin(ctx)?;
        Self::validate(&input)?;
        let current = self.get(id).await?;
        let beer = Beer {
            name: input.name.trim().to_string(),
            brewery: input.brewery.trim().to_string(),
            style: input.style,
            abv: input.abv,
            venue: input.venue,
            lat: input.lat,
            lng: input.lng,
            description: input.description,
            ..current
        };
        if !self.beers.update_beer(&beer).await? {
            return Err(AppError::not_found("beer", id));
        }
        self.log_admin(ctx, admin_id, &id, format!("updated beer {}", beer.name))
            .await;
        Ok(beer)
    }

    pub async fn delete(&self, id: Uuid, ctx: &ActorContext) -> Result<()> {
        let admin_id = Self::require_admin(ctx)?;
        if !self.beers.delete_beer(id).await? {
            return Err(AppError::not_found("beer", id));
        }
        self.log_admin(ctx, admin_id, &id, "deleted beer".to_string())
            .await;
        Ok(())
    }

    async fn log_admin(&self, ctx: &ActorContext, admin_id: Uuid, beer_id: &Uuid, message: String) {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            user_id: Some(admin_id),
            device_id: None,
            kind: ActivityKind::AdminAction,
            subject_type: "beer".into(),
            subject_id: Some(*beer_id),
            message,
            metadata: json!({}),
            ip_hash: ctx.ip_hash.clone(),
            user_agent: ctx.user_agent.clone(),
            created_at: Utc::now(),
        };
        if let Err(err) = self.activity.append(&entry).await {
            warn!(%err, "failed to append admin activity");
        }
    }
}
