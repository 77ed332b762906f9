use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;
use tracing::{info, instrument};

use super::client::LlmError;
use super::dto::{MenuResponse, PromptRequest, TextResponse};
use super::extract::{clean_plain_text, extract_json_object};
use super::prompts::is_alternative_prompt;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const MENU_FAILED: &str = "Error al generar el menú";
const TEXT_FAILED: &str = "Error al generar el texto";

pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/generate-menu", post(generate_menu))
        .route("/generate-text", post(generate_text))
}

fn require_prompt(body: &PromptRequest) -> AppResult<&str> {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::BadRequest("El prompt es obligatorio".into()));
    }
    Ok(prompt)
}

/// POST /api/generate-menu { prompt }
#[instrument(skip(state, body))]
pub async fn generate_menu(
    State(state): State<AppState>,
    Json(body): Json<PromptRequest>,
) -> AppResult<Json<MenuResponse>> {
    let prompt = require_prompt(&body)?;
    let text = state
        .llm
        .generate(prompt)
        .await
        .map_err(|e| AppError::upstream(MENU_FAILED, e))?;

    if is_alternative_prompt(prompt) {
        let dish = clean_plain_text(&text);
        if dish.is_empty() {
            return Err(AppError::upstream(MENU_FAILED, LlmError::EmptyResponse));
        }
        info!(%dish, "alternative dish generated");
        return Ok(Json(MenuResponse {
            menu: Value::String(dish),
        }));
    }

    let menu = extract_json_object(&text)?;
    Ok(Json(MenuResponse { menu }))
}

/// POST /api/generate-text { prompt }
#[instrument(skip(state, body))]
pub async fn generate_text(
    State(state): State<AppState>,
    Json(body): Json<PromptRequest>,
) -> AppResult<Json<TextResponse>> {
    let prompt = require_prompt(&body)?;
    let text = state
        .llm
        .generate(prompt)
        .await
        .map_err(|e| AppError::upstream(TEXT_FAILED, e))?;
    Ok(Json(TextResponse {
        text: text.trim().to_string(),
    }))
}
