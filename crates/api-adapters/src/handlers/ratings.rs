use axum::extract::{Query, State};
use axum::Json;

use domains::RatingSummary;
use services::coerce_score;

use crate::dto::{MineQuery, MineResponse, QuickRatingRequest};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

/// Anonymous-capable quick rating. A cookieless caller gets a device id on
/// this very response and the rating lands on it.
pub async fn submit_quick(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<QuickRatingRequest>,
) -> ApiResult<Json<RatingSummary>> {
    let score = coerce_score(req.score)?;
    let summary = state.ratings.submit(req.beer_id, score, &identity.ctx).await?;
    state.metrics.ratings_submitted.inc();
    Ok(Json(summary))
}

/// The caller's own score. 401 when no identity was ever established.
pub async fn my_quick(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<MineQuery>,
) -> ApiResult<Json<MineResponse>> {
    identity.require_established()?;
    let score = state.ratings.my_rating(query.beer_id, &identity.ctx).await?;
    Ok(Json(MineResponse { score }))
}
