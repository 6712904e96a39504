use axum::{extract::State, http::StatusCode, response::Json};
use validator::Validate;

use crate::{
    AppState,
    error::Result,
    models::{LoginRequest, RegisterRequest, Session},
};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Session>)> {
    payload.validate()?;

    let session = state
        .users
        .register(&payload.username, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Session>> {
    let session = state
        .users
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(session))
}
