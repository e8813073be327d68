use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::dto::{BeerPayload, BeerView};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

pub async fn create_beer(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<BeerPayload>,
) -> ApiResult<(StatusCode, Json<BeerView>)> {
    let beer = state.catalog.create(payload.into(), &identity.ctx).await?;
    Ok((StatusCode::CREATED, Json(beer.into())))
}

pub async fn update_beer(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<BeerPayload>,
) -> ApiResult<Json<BeerView>> {
    let beer = state
        .catalog
        .update(id, payload.into(), &identity.ctx)
        .await?;
    Ok(Json(beer.into()))
}

pub async fn delete_beer(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.catalog.delete(id, &identity.ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}
