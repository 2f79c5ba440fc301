mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use tokio::signal;
use tracing::{error, info};

use config::EnvironmentConfig;
use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use services::image_generation_service::HttpImageGenerator;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🔧 Garage Booking - API de talleres");
    info!("===================================");

    let config = EnvironmentConfig::from_env()?;

    // Inicializar base de datos
    if let Ok(url) = std::env::var("DATABASE_URL") {
        info!("📦 Conectando a {}", database::connection::mask_database_url(&url));
    }
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    // Cliente del proveedor de imágenes
    let image_generator = Arc::new(HttpImageGenerator::new(
        config.image_api_url.clone(),
        config.image_api_key.clone(),
        config.image_provider.clone(),
    ));

    let app_state = AppState::new(pool, config.clone(), image_generator);

    // Rutas protegidas por el middleware de autenticación
    let protected = Router::new()
        .nest("/api/vehicles", routes::vehicle_routes::create_vehicle_router())
        .nest("/api/bookings", routes::booking_routes::create_booking_router())
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::auth_middleware,
        ));

    let cors = if config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest(
            "/public/bookings",
            routes::booking_routes::create_public_booking_router(),
        )
        .merge(protected)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚗 Vehicles:");
    info!("   POST /api/vehicles - Crear vehículo");
    info!("   GET  /api/vehicles - Listar vehículos (page, limit, search, ownerId)");
    info!("   GET  /api/vehicles/:id - Obtener vehículo");
    info!("   PUT  /api/vehicles/:id - Actualizar vehículo");
    info!("   DELETE /api/vehicles/:id - Desactivar vehículo");
    info!("   POST /api/vehicles/generate-image - Generar imagen del vehículo");
    info!("   GET  /api/vehicles/metrics - Métricas agregadas");
    info!("   GET  /api/vehicles/clients - Roster de clientes");
    info!("   GET  /api/vehicles/booking-options - Vehículos para el formulario de reserva");
    info!("📅 Bookings:");
    info!("   POST /api/bookings - Crear reserva (app)");
    info!("   POST /api/bookings/walk-in - Crear reserva walk-in");
    info!("   POST /public/bookings - Crear reserva pública");
    info!("   GET  /api/bookings - Listar reservas (page, limit, status)");
    info!("   GET  /api/bookings/:id - Obtener reserva");
    info!("   POST /api/bookings/:id/confirm - Confirmar reserva");
    info!("   POST /api/bookings/:id/start - Iniciar servicio");
    info!("   POST /api/bookings/:id/cancel - Cancelar reserva");
    info!("   POST /api/bookings/:id/complete - Completar reserva");
    info!("   DELETE /api/bookings/:id - Desactivar reserva");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "garage-booking",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
