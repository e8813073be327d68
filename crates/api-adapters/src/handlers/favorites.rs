use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::dto::{BeerView, FavoriteResponse};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

pub async fn status(
    State(state): State<AppState>,
    identity: Identity,
    Path(beer_id): Path<Uuid>,
) -> ApiResult<Json<FavoriteResponse>> {
    let favorited = state.favorites.status(beer_id, &identity.ctx).await?;
    Ok(Json(FavoriteResponse { favorited }))
}

pub async fn add(
    State(state): State<AppState>,
    identity: Identity,
    Path(beer_id): Path<Uuid>,
) -> ApiResult<Json<FavoriteResponse>> {
    let favorited = state.favorites.set(beer_id, true, &identity.ctx).await?;
    state.metrics.favorites_toggled.inc();
    Ok(Json(FavoriteResponse { favorited }))
}

pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Path(beer_id): Path<Uuid>,
) -> ApiResult<Json<FavoriteResponse>> {
    let favorited = state.favorites.set(beer_id, false, &identity.ctx).await?;
    state.metrics.favorites_toggled.inc();
    Ok(Json(FavoriteResponse { favorited }))
}

pub async fn mine(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<Vec<BeerView>>> {
    let beers = state.favorites.list(&identity.ctx).await?;
    Ok(Json(beers.into_iter().map(BeerView::from).collect()))
}
