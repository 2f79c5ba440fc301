//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP con cuerpo problem-style
//! {type, title, detail, instance?}.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Cuerpo de error para la API (problem-style)
#[derive(Debug, serde::Serialize)]
pub struct ProblemBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemBody {
    fn new(error_type: &str, title: &str, detail: String) -> Self {
        Self {
            error_type: error_type.to_string(),
            title: title.to_string(),
            detail,
            instance: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(e) => {
                error!("Database error: {}", e);
                // Detalle genérico: no filtrar internos al cliente
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ProblemBody::new(
                        "internal_error",
                        "Internal Server Error",
                        "Ha ocurrido un error inesperado".to_string(),
                    ),
                )
            }

            AppError::Validation(e) => {
                warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ProblemBody::new(
                        "validation_error",
                        "Validation Error",
                        first_validation_detail(&e),
                    ),
                )
            }

            AppError::Unauthorized(msg) => {
                warn!("Unauthorized access: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ProblemBody::new("unauthorized", "Unauthorized", msg),
                )
            }

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ProblemBody::new("not_found", "Not Found", msg),
            ),

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ProblemBody::new("bad_request", "Bad Request", msg),
            ),

            AppError::RateLimited(msg) => {
                warn!("Upstream rate limit: {}", msg);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    ProblemBody::new(
                        "rate_limited",
                        "Rate Limit Exceeded",
                        "El proveedor externo alcanzó su límite de uso. Intenta más tarde"
                            .to_string(),
                    ),
                )
            }

            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ProblemBody::new(
                        "internal_error",
                        "Internal Server Error",
                        "Ha ocurrido un error inesperado".to_string(),
                    ),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Extraer el primer mensaje legible de un conjunto de errores de validación
fn first_validation_detail(errors: &validator::ValidationErrors) -> String {
    for (field, field_errors) in errors.field_errors() {
        if let Some(e) = field_errors.first() {
            return match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("El campo '{}' es inválido", field),
            };
        }
    }
    "Los datos enviados son inválidos".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::validation_error;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_maps_to_404_problem_body() {
        let (status, body) = body_json(AppError::NotFound("Vehículo no encontrado".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["type"], "not_found");
        assert_eq!(body["title"], "Not Found");
        assert_eq!(body["detail"], "Vehículo no encontrado");
    }

    #[tokio::test]
    async fn validation_error_names_failing_field() {
        let err = validation_error("year", "El campo 'year' debe ser numérico");
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], "validation_error");
        assert_eq!(body["detail"], "El campo 'year' debe ser numérico");
    }

    #[tokio::test]
    async fn rate_limited_maps_to_429() {
        let (status, body) = body_json(AppError::RateLimited("quota exceeded".into())).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["type"], "rate_limited");
    }

    #[tokio::test]
    async fn internal_detail_is_generic() {
        let (status, body) =
            body_json(AppError::Internal("secret upstream stacktrace".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Ha ocurrido un error inesperado");
    }
}
