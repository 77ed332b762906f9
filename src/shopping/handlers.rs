use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{CheckRequest, ShoppingListResponse};
use super::services::aggregate;
use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::plans::dto::WeekQuery;
use crate::plans::services::resolve_week;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shopping-list", get(get_list))
        .route("/shopping-list/:id", patch(check_entry))
}

/// GET /api/shopping-list?week=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn get_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeekQuery>,
) -> AppResult<Json<ShoppingListResponse>> {
    let week_start = resolve_week(q.week.as_deref())?;
    let plan = state
        .store
        .find_plan(user_id, week_start)
        .await?
        .ok_or(AppError::NotFound("No hay menú para esa semana"))?;
    let entries = state.store.list_entries(user_id, plan.id).await?;
    Ok(Json(ShoppingListResponse {
        meal_plan_id: plan.id,
        summary: aggregate(&entries),
        entries,
    }))
}

/// PATCH /api/shopping-list/:id { checked }
#[instrument(skip(state))]
pub async fn check_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CheckRequest>,
) -> AppResult<Json<Value>> {
    if !state.store.set_entry_checked(user_id, id, body.checked).await? {
        return Err(AppError::NotFound("Elemento no encontrado"));
    }
    info!(entry_id = %id, checked = body.checked, "shopping entry updated");
    Ok(Json(json!({ "id": id, "checked": body.checked })))
}
