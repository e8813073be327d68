use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::dto::{BeerListQuery, BeerView, PageQuery};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BeerListQuery>,
) -> ApiResult<Json<Vec<BeerView>>> {
    let beers = state
        .catalog
        .list(
            query.q,
            query.style,
            query.skip.unwrap_or(0),
            query.take.unwrap_or(0),
        )
        .await?;
    Ok(Json(beers.into_iter().map(BeerView::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BeerView>> {
    Ok(Json(state.catalog.get(id).await?.into()))
}

pub async fn similar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<BeerView>>> {
    let beers = state.catalog.similar(id, query.take.unwrap_or(0)).await?;
    Ok(Json(beers.into_iter().map(BeerView::from).collect()))
}
