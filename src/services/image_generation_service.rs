//! Servicio de generación de imágenes de vehículos
//!
//! Cliente del proveedor externo de generación de imágenes. El proveedor
//! queda detrás de un trait para poder sustituirlo en tests.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::utils::errors::AppError;

/// Parámetros de generación
#[derive(Debug, Clone)]
pub struct ImagePrompt {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
}

impl ImagePrompt {
    fn render(&self) -> String {
        format!(
            "A professional studio photograph of a {} {} {} {}, three-quarter front view, neutral background",
            self.color, self.year, self.make, self.model
        )
    }
}

/// Fallo del proveedor, con el mensaje original para clasificarlo
#[derive(Debug)]
pub struct ImageGenError {
    pub message: String,
}

impl std::fmt::Display for ImageGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Clasificar un fallo del proveedor: agotamiento de cuota se reporta como
/// rate-limit (reintentable más tarde), cualquier otro fallo como interno.
pub fn map_provider_error(err: ImageGenError) -> AppError {
    if err.message.contains("quota") || err.message.contains("rate limit") {
        AppError::RateLimited(err.message)
    } else {
        AppError::Internal(format!("Image provider error: {}", err.message))
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Etiqueta del proveedor para auditoría
    fn provider(&self) -> &str;

    /// Generar una imagen y devolver su URL
    async fn generate(&self, prompt: &ImagePrompt) -> Result<String, ImageGenError>;
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    data: Vec<ProviderImage>,
}

#[derive(Debug, Deserialize)]
struct ProviderImage {
    url: String,
}

/// Implementación HTTP del proveedor
pub struct HttpImageGenerator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    provider: String,
}

impl HttpImageGenerator {
    pub fn new(api_url: String, api_key: String, provider: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            provider,
        }
    }
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn generate(&self, prompt: &ImagePrompt) -> Result<String, ImageGenError> {
        info!("Generando imagen para {} {} {}", prompt.year, prompt.make, prompt.model);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "prompt": prompt.render(),
                "n": 1,
                "size": "1024x1024",
            }))
            .send()
            .await
            .map_err(|e| ImageGenError {
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Un 429 del proveedor debe clasificarse como rate-limit aunque
            // el cuerpo no traiga el texto esperado
            let prefix = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                "rate limit: "
            } else {
                ""
            };
            return Err(ImageGenError {
                message: format!("{}provider returned {}: {}", prefix, status, body),
            });
        }

        let parsed: ProviderResponse = response.json().await.map_err(|e| ImageGenError {
            message: format!("invalid provider response: {}", e),
        })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|img| img.url)
            .ok_or_else(|| ImageGenError {
                message: "provider returned no images".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_and_rate_limit_messages_classify_as_rate_limited() {
        let err = ImageGenError {
            message: "You exceeded your current quota, please check your plan".to_string(),
        };
        assert!(matches!(map_provider_error(err), AppError::RateLimited(_)));

        let err = ImageGenError {
            message: "rate limit reached for requests".to_string(),
        };
        assert!(matches!(map_provider_error(err), AppError::RateLimited(_)));
    }

    #[test]
    fn other_provider_failures_classify_as_internal() {
        let err = ImageGenError {
            message: "connection reset by peer".to_string(),
        };
        assert!(matches!(map_provider_error(err), AppError::Internal(_)));
    }

    #[test]
    fn classification_is_case_sensitive() {
        // La coincidencia es por substring literal, en minúsculas
        let err = ImageGenError {
            message: "QUOTA EXCEEDED".to_string(),
        };
        assert!(matches!(map_provider_error(err), AppError::Internal(_)));
    }

    #[test]
    fn prompt_includes_color_year_make_and_model() {
        let prompt = ImagePrompt {
            make: "Peugeot".to_string(),
            model: "208".to_string(),
            year: 2021,
            color: "silver".to_string(),
        };
        let text = prompt.render();
        assert!(text.contains("silver"));
        assert!(text.contains("2021"));
        assert!(text.contains("Peugeot"));
        assert!(text.contains("208"));
    }
}
