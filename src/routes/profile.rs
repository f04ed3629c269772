use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::profile_dto::UpdateProfilePayload,
    error::{Error, Result},
    utils::validation::validate,
    AppState,
};

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let profile = state
        .store
        .fetch(&id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Profile {} not found", id)))?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    validate(&payload)?;
    let profile = state
        .store
        .update(&id, &payload.into_patch())
        .await?
        .ok_or_else(|| Error::NotFound(format!("Profile {} not found", id)))?;
    Ok(Json(profile))
}
