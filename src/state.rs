//! Shared application state
//!
//! Estado compartido de la aplicación que se pasa a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::EnvironmentConfig;
use crate::services::image_generation_service::ImageGenerator;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub image_generator: Arc<dyn ImageGenerator>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        image_generator: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self {
            pool,
            config,
            image_generator,
        }
    }
}
