use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    AlternativeRequest, AlternativeResponse, CreatePlanRequest, CreatedPlanResponse, WeekQuery,
};
use super::repo_types::MealPlan;
use super::services::{create_plan, replace_dish, resolve_week};
use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::menu::model::{Day, Slot};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(get_plan).post(post_plan))
        .route("/plans/:id", delete(delete_plan))
        .route("/plans/:id/alternative", post(post_alternative))
}

/// POST /api/plans { week_start? }
#[instrument(skip(state))]
pub async fn post_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Option<Json<CreatePlanRequest>>,
) -> AppResult<(StatusCode, Json<CreatedPlanResponse>)> {
    let Json(body) = body.unwrap_or_default();
    let week_start = resolve_week(body.week_start.as_deref())?;
    let created = create_plan(&state, user_id, week_start).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/plans?week=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeekQuery>,
) -> AppResult<Json<MealPlan>> {
    let week_start = resolve_week(q.week.as_deref())?;
    state
        .store
        .find_plan(user_id, week_start)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("No hay menú para esa semana"))
}

/// DELETE /api/plans/:id
#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.store.delete_plan(user_id, id).await? {
        return Err(AppError::NotFound("Menú no encontrado"));
    }
    info!(%user_id, plan_id = %id, "plan deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/plans/:id/alternative { day, meal_type }
#[instrument(skip(state))]
pub async fn post_alternative(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AlternativeRequest>,
) -> AppResult<Json<AlternativeResponse>> {
    let day = Day::parse(&body.day).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let slot = Slot::parse(&body.meal_type).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Json(replace_dish(&state, user_id, id, day, slot).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::extractors::JwtKeys;
    use crate::llm::client::LlmError;
    use crate::llm::testing::ScriptedLlm;
    use crate::menu::fallback::example_menu;
    use crate::profiles::dto::Profile;
    use crate::shopping::repo_types::UNAVAILABLE;
    use axum::{
        body::{to_bytes, Body},
        extract::FromRef,
        http::Request,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Harness {
        state: AppState,
        llm: Arc<ScriptedLlm>,
        user_id: Uuid,
        token: String,
    }

    impl Harness {
        async fn new(llm: ScriptedLlm, intolerances: &[&str]) -> Self {
            let llm = Arc::new(llm);
            let state = AppState::with_llm(llm.clone());
            let user_id = Uuid::new_v4();
            let token = format!("Bearer {}", JwtKeys::from_ref(&state).sign(user_id, 600));
            state
                .store
                .upsert_profile(&Profile {
                    id: user_id,
                    display_name: "Ana".into(),
                    goal: "Perder peso".into(),
                    intolerances: intolerances.iter().map(|s| s.to_string()).collect(),
                    weight: Some(64.0),
                    height: Some(168.0),
                })
                .await
                .unwrap();
            Self {
                state,
                llm,
                user_id,
                token,
            }
        }

        async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder()
                .method(method)
                .uri(uri)
                .header("authorization", &self.token);
            let req = match body {
                Some(b) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(b.to_string())),
                None => builder.body(Body::empty()),
            }
            .unwrap();
            let res = routes()
                .with_state(self.state.clone())
                .oneshot(req)
                .await
                .unwrap();
            let status = res.status();
            let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }
    }

    fn menu_or_ingredients(prompt: &str) -> Result<String, LlmError> {
        if prompt.contains("menú semanal") {
            let mut menu = example_menu().to_value();
            menu["martes"]["Cena"] = json!("Tortilla de patatas");
            Ok(menu.to_string())
        } else if prompt.contains("plato alternativo") {
            Ok("Merluza en salsa verde".into())
        } else if prompt.contains("\"Tortilla de patatas\"") {
            Err(LlmError::Upstream("quota".into()))
        } else {
            Ok(r#"[{"nombre": "Cebolla", "cantidad": "1 un"}, {"nombre": "Sal", "cantidad": "al gusto"}]"#.into())
        }
    }

    #[tokio::test]
    async fn create_get_and_replace_week() {
        let h = Harness::new(ScriptedLlm::new(menu_or_ingredients), &[]).await;

        let (status, body) = h
            .send("POST", "/plans", Some(json!({"week_start": "2024-01-17"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["plan"]["week_start"], "2024-01-15");
        assert_eq!(body["plan"]["title"], "Menú semana del 15/01/2024");
        assert_eq!(body["menu"], json!({"source": "generated", "attempts": 1}));
        assert_eq!(body["unavailable"], json!(["Tortilla de patatas"]));
        assert_eq!(body["plan"]["meals"]["martes"]["Cena"], "Tortilla de patatas");
        let plan_id: Uuid = serde_json::from_value(body["plan"]["id"].clone()).unwrap();

        let entries = h.state.store.list_entries(h.user_id, plan_id).await.unwrap();
        let tortilla: Vec<_> = entries
            .iter()
            .filter(|e| e.dish == "Tortilla de patatas")
            .collect();
        assert_eq!(tortilla.len(), 1);
        assert_eq!(tortilla[0].ingredient, UNAVAILABLE);
        assert_eq!(tortilla[0].quantity, "");
        assert_eq!(entries.len(), 35);

        let (status, body) = h.send("GET", "/plans?week=2024-01-21", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], json!(plan_id));

        // regenerating the same week replaces the plan and its rows
        let (_, body) = h
            .send("POST", "/plans", Some(json!({"week_start": "2024-01-15"})))
            .await;
        let second: Uuid = serde_json::from_value(body["plan"]["id"].clone()).unwrap();
        assert_ne!(second, plan_id);
        assert!(h.state.store.get_plan(h.user_id, plan_id).await.unwrap().is_none());
        assert!(h.state.store.list_entries(h.user_id, plan_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn alternative_replaces_slot_rows() {
        let h = Harness::new(ScriptedLlm::new(menu_or_ingredients), &[]).await;
        let (_, body) = h
            .send("POST", "/plans", Some(json!({"week_start": "2024-01-15"})))
            .await;
        let plan_id = body["plan"]["id"].as_str().unwrap().to_string();

        let (status, body) = h
            .send(
                "POST",
                &format!("/plans/{plan_id}/alternative"),
                Some(json!({"day": "Martes", "meal_type": "cena"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dish"], "Merluza en salsa verde");
        assert_eq!(body["plan"]["meals"]["martes"]["Cena"], "Merluza en salsa verde");
        assert_eq!(body["ingredients_unavailable"], false);

        let plan_id: Uuid = plan_id.parse().unwrap();
        let entries = h.state.store.list_entries(h.user_id, plan_id).await.unwrap();
        assert!(entries.iter().all(|e| e.dish != "Tortilla de patatas"));
        let merluza: Vec<_> = entries
            .iter()
            .filter(|e| e.day == Day::Martes && e.meal_type == Slot::Cena)
            .collect();
        assert_eq!(merluza.len(), 1);
        assert_eq!(merluza[0].ingredient, "Cebolla");
    }

    #[tokio::test]
    async fn alternative_rejects_unknown_slot() {
        let h = Harness::new(ScriptedLlm::new(menu_or_ingredients), &[]).await;
        let (status, _) = h
            .send(
                "POST",
                &format!("/plans/{}/alternative", Uuid::new_v4()),
                Some(json!({"day": "lunes", "meal_type": "brunch"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn gluten_profile_falls_back_to_example_week() {
        let llm = ScriptedLlm::new(|prompt| {
            if prompt.contains("menú semanal") {
                let mut menu = example_menu().to_value();
                menu["lunes"]["Desayuno"] = json!("Tostadas con gluten");
                Ok(menu.to_string())
            } else {
                Ok(r#"[{"nombre": "Arroz", "cantidad": "80 g"}]"#.into())
            }
        });
        let h = Harness::new(llm, &["Gluten"]).await;

        let (status, body) = h.send("POST", "/plans", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["menu"]["source"], "fallback");
        assert_eq!(body["plan"]["meals"], example_menu().to_value());
        assert_eq!(h.llm.calls_matching("menú semanal"), 3);
    }

    #[tokio::test]
    async fn delete_and_missing_plans() {
        let h = Harness::new(ScriptedLlm::new(menu_or_ingredients), &[]).await;
        let (status, _) = h.send("GET", "/plans?week=2030-01-07", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = h.send("POST", "/plans", Some(json!({}))).await;
        let plan_id = body["plan"]["id"].as_str().unwrap().to_string();
        let (status, _) = h.send("DELETE", &format!("/plans/{plan_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = h.send("DELETE", &format!("/plans/{plan_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn plan_requires_profile() {
        let llm = Arc::new(ScriptedLlm::new(menu_or_ingredients));
        let state = AppState::with_llm(llm.clone());
        let token = format!("Bearer {}", JwtKeys::from_ref(&state).sign(Uuid::new_v4(), 600));
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::post("/plans")
                    .header("authorization", token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(llm.calls(), 0);
    }
}
