use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use services::{CommentView, NewComment};

use crate::dto::{NewCommentRequest, PageQuery};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Path(beer_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let views = state
        .comments
        .list(
            beer_id,
            query.skip.unwrap_or(0),
            query.take.unwrap_or(0),
            &identity.ctx,
        )
        .await?;
    Ok(Json(views))
}

pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Path(beer_id): Path<Uuid>,
    Json(req): Json<NewCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let view = state
        .comments
        .create(
            beer_id,
            NewComment {
                body: req.body,
                display_name: req.display_name,
                parent_id: req.parent_id,
            },
            &identity.ctx,
        )
        .await?;
    state.metrics.comments_created.inc();
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Path((beer_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .comments
        .remove(beer_id, comment_id, &identity.ctx)
        .await?;
    state.metrics.comments_removed.inc();
    Ok(StatusCode::NO_CONTENT)
}
