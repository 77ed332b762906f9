use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::dto::{DishIngredientsResponse, DishRequest, Recipe, RecipeRequest};
use super::services::recipe_detail;
use crate::error::{AppError, AppResult};
use crate::llm::client::LlmError;
use crate::shopping::services::{fetch_ingredients, IngredientError};
use crate::state::AppState;

const INGREDIENTS_FAILED: &str = "No se pudieron obtener los ingredientes del plato";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/receta-detalle", post(get_recipe))
        .route("/ingredientes-plato", post(dish_ingredients))
}

/// POST /api/receta-detalle { nombre }
#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Json(body): Json<RecipeRequest>,
) -> AppResult<Json<Recipe>> {
    let name = body.nombre.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("El nombre de la receta es obligatorio".into()));
    }
    Ok(Json(recipe_detail(state.llm.as_ref(), name).await))
}

/// POST /api/ingredientes-plato { plato }
#[instrument(skip(state))]
pub async fn dish_ingredients(
    State(state): State<AppState>,
    Json(body): Json<DishRequest>,
) -> AppResult<Json<DishIngredientsResponse>> {
    let dish = body.plato.trim();
    if dish.is_empty() {
        return Err(AppError::BadRequest("El plato es obligatorio".into()));
    }
    let ingredientes = fetch_ingredients(
        state.llm.as_ref(),
        dish,
        state.config.ingredient_max_attempts,
    )
    .await
    .into_value()
    .map_err(|e| match e {
        IngredientError::Llm(e) => AppError::upstream(INGREDIENTS_FAILED, e),
        IngredientError::Extract(e) => AppError::Unparseable(e),
        IngredientError::Empty => AppError::upstream(INGREDIENTS_FAILED, LlmError::EmptyResponse),
    })?;
    Ok(Json(DishIngredientsResponse { ingredientes }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedLlm;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn post(llm: Arc<ScriptedLlm>, uri: &str, body: Value) -> (StatusCode, Value) {
        let app = routes().with_state(AppState::with_llm(llm));
        let res = app
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn recipe_always_answers() {
        let llm = Arc::new(ScriptedLlm::new(|_| Err(LlmError::EmptyResponse)));
        let (status, body) = post(llm, "/receta-detalle", json!({"nombre": "Gazpacho"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nombre"], "Gazpacho");
        assert!(!body["pasos"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dish_ingredients_retries_then_answers() {
        let llm = Arc::new(ScriptedLlm::sequence(vec![
            "nada",
            r#"[{"nombre": "Tomate", "cantidad": "500 g"}]"#,
        ]));
        let (status, body) =
            post(llm.clone(), "/ingredientes-plato", json!({"plato": "Gazpacho"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"ingredientes": [{"nombre": "Tomate", "cantidad": "500 g"}]})
        );
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn dish_ingredients_exhausted_is_500() {
        let llm = Arc::new(ScriptedLlm::new(|_| Err(LlmError::Upstream("down".into()))));
        let (status, body) =
            post(llm.clone(), "/ingredientes-plato", json!({"plato": "Gazpacho"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INGREDIENTS_FAILED);
        assert_eq!(llm.calls(), 3);
    }
}
