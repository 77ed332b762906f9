use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::llm::client::LlmError;
use crate::llm::extract::ExtractError;
use crate::storage::StoreError;

/// Errors returned to HTTP clients. Messages are user-facing Spanish text;
/// internal detail is logged and never sent.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No autorizado")]
    Unauthorized,

    /// The session points at a profile that can no longer be read.
    #[error("Tu sesión no es válida, vuelve a iniciar sesión")]
    SessionInvalid,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(&'static str),

    /// The model could not be reached or answered unusably.
    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("La respuesta de la IA no tiene un formato válido")]
    Unparseable(#[from] ExtractError),

    #[error("Error interno del servidor")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn upstream(message: &'static str, source: LlmError) -> Self {
        Self::Upstream { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized | AppError::SessionInvalid => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { source, .. } => {
                error!(error = %source, "llm request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Unparseable(e) => {
                error!(error = %e, "llm answer could not be parsed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Store(e) => {
                error!(error = %e, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.to_string();
        let body = if matches!(self, AppError::SessionInvalid) {
            json!({ "error": message, "sign_out": true })
        } else {
            json!({ "error": message })
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn session_invalid_asks_for_sign_out() {
        let (status, body) = body_of(AppError::SessionInvalid).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["sign_out"], true);
        assert!(body["error"].as_str().unwrap().contains("sesión"));
    }

    #[tokio::test]
    async fn upstream_hides_internal_detail() {
        let err = AppError::upstream(
            "Error al generar el menú",
            LlmError::Upstream("quota exceeded for key abc".into()),
        );
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Error al generar el menú" }));
    }
}
