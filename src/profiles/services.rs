use tracing::{error, instrument};
use uuid::Uuid;

use super::dto::Profile;
use crate::error::{AppError, AppResult};
use crate::storage::PlanStore;

/// Loads the caller's profile. A storage failure here means the session
/// can't be trusted, so the client is told to sign out.
#[instrument(skip(store))]
pub async fn load_profile(store: &dyn PlanStore, user_id: Uuid) -> AppResult<Option<Profile>> {
    store.get_profile(user_id).await.map_err(|e| {
        error!(error = %e, "profile lookup failed");
        AppError::SessionInvalid
    })
}

/// Like [`load_profile`] but a missing profile is an error.
pub async fn require_profile(store: &dyn PlanStore, user_id: Uuid) -> AppResult<Profile> {
    load_profile(store, user_id)
        .await?
        .ok_or(AppError::NotFound("Completa tu perfil antes de continuar"))
}
