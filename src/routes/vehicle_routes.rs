//! Rutas de Vehicles

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{
    BookingOptionItem, BookingOptionsQuery, ClientsResponse, CreateVehicleRequest,
    GenerateImageRequest, GeneratedImageData, MetricsResponse, PagedVehiclesResponse,
    UpdateVehicleRequest, VehicleListQuery, VehicleResponse,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/generate-image", post(generate_image))
        .route("/metrics", get(metrics))
        .route("/clients", get(clients))
        .route("/booking-options", get(booking_options))
        .route("/", get(list_vehicles))
        .route("/", post(create_vehicle))
        .route("/:id", get(get_vehicle))
        .route("/:id", put(update_vehicle))
        .route("/:id", delete(delete_vehicle))
}

fn controller(state: &AppState) -> VehicleController {
    VehicleController::new(state.pool.clone(), state.image_generator.clone())
}

async fn generate_image(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<GenerateImageRequest>,
) -> AppResult<Json<ApiResponse<GeneratedImageData>>> {
    Ok(Json(controller(&state).generate_image(user, request).await?))
}

async fn metrics(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<MetricsResponse>> {
    Ok(Json(controller(&state).metrics(user).await?))
}

async fn clients(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<ClientsResponse>> {
    Ok(Json(controller(&state).clients(user).await?))
}

async fn booking_options(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(query): Query<BookingOptionsQuery>,
) -> AppResult<Json<ApiResponse<Vec<BookingOptionItem>>>> {
    Ok(Json(
        controller(&state)
            .booking_options(user, query.owner_id)
            .await?,
    ))
}

async fn list_vehicles(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> AppResult<Json<PagedVehiclesResponse>> {
    Ok(Json(controller(&state).list(user, query).await?))
}

async fn get_vehicle(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VehicleResponse>>> {
    Ok(Json(controller(&state).get_by_id(user, id).await?))
}

async fn create_vehicle(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> AppResult<Json<ApiResponse<VehicleResponse>>> {
    Ok(Json(controller(&state).create(user, request).await?))
}

async fn update_vehicle(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> AppResult<Json<ApiResponse<VehicleResponse>>> {
    Ok(Json(controller(&state).update(user, id, request).await?))
}

async fn delete_vehicle(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    controller(&state).delete(user, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Vehículo desactivado exitosamente"
    })))
}
