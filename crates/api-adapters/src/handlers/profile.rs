use axum::extract::{Query, State};
use axum::Json;

use services::ProfileView;

use crate::dto::{ActivityView, PageQuery};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

/// Profile load: merges the device's anonymous activity into the account
/// and self-heals the engagement counters before responding.
pub async fn me(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<ProfileView>> {
    Ok(Json(state.profile.load(&identity.ctx).await?))
}

pub async fn activities(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<ActivityView>>> {
    let entries = state
        .profile
        .activities(&identity.ctx, query.take.unwrap_or(0))
        .await?;
    Ok(Json(entries.into_iter().map(ActivityView::from).collect()))
}
