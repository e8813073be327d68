use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state.auth.register(&req.username, &req.password).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let (_, token) = state.auth.login(&req.username, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}
