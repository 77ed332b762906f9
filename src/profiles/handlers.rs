use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use super::dto::{Profile, UpdateProfileRequest};
use super::services::require_profile;
use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

/// GET /api/profile
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Profile>> {
    Ok(Json(require_profile(state.store.as_ref(), user_id).await?))
}

/// PUT /api/profile
#[instrument(skip(state, body))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<Profile>> {
    body.validate()
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    let profile = body.into_profile(user_id);
    state.store.upsert_profile(&profile).await?;
    info!(%user_id, intolerances = profile.intolerances.len(), "profile saved");
    Ok(Json(profile))
}
