//! Middleware de autenticación JWT
//!
//! Maneja la autenticación JWT, extracción de tokens y verificación del
//! principal. Inyecta un `AuthenticatedUser` explícito que cada handler
//! consume como argumento; los handlers nunca leen estado ambiental.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::EnvironmentConfig, repositories::user_repository::UserRepository, state::AppState,
    utils::errors::AppError,
};

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub org_id: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Principal autenticado que se inyecta en las requests
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub org_id: Option<Uuid>,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token_data = decode::<Claims>(
        auth_header,
        &DecodingKey::from_secret(state.config.jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))?;

    let claims = token_data.claims;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?;
    let org_id = match &claims.org_id {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| AppError::Unauthorized("ID de organización inválido".to_string()))?,
        ),
        None => None,
    };

    // Verificar que el usuario existe y está activo
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized(
            "Usuario inactivo o suspendido".to_string(),
        ));
    }

    let authenticated_user = AuthenticatedUser { user_id, org_id };
    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}

/// Generar un JWT para un principal
pub fn generate_jwt_token(
    user_id: Uuid,
    org_id: Option<Uuid>,
    config: &EnvironmentConfig,
) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(config.jwt_expiration as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        org_id: org_id.map(|id| id.to_string()),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_ref());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Error generando JWT: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EnvironmentConfig {
        EnvironmentConfig {
            environment: "test".to_string(),
            port: 3000,
            host: "localhost".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiration: 3600,
            cors_origins: vec![],
            image_api_url: "http://localhost".to_string(),
            image_api_key: "key".to_string(),
            image_provider: "test".to_string(),
        }
    }

    #[test]
    fn token_roundtrip_preserves_principal() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let org_id = Some(Uuid::new_v4());

        let token = generate_jwt_token(user_id, org_id, &config).unwrap();
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, user_id.to_string());
        assert_eq!(decoded.claims.org_id, org_id.map(|id| id.to_string()));
    }

    #[test]
    fn token_without_org_decodes_with_none() {
        let config = test_config();
        let token = generate_jwt_token(Uuid::new_v4(), None, &config).unwrap();
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .unwrap();
        assert!(decoded.claims.org_id.is_none());
    }
}
