//! Rutas de Bookings

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingListQuery, BookingResponse, CancelBookingRequest, CreateBookingRequest,
    PagedBookingsResponse,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppResult;

/// Rutas autenticadas de reservas
pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_bookings))
        .route("/walk-in", post(create_walk_in_booking))
        .route("/:id", get(get_booking))
        .route("/:id", delete(delete_booking))
        .route("/:id/confirm", post(confirm_booking))
        .route("/:id/start", post(start_booking))
        .route("/:id/cancel", post(cancel_booking))
        .route("/:id/complete", post(complete_booking))
}

/// Rutas públicas de reservas (sin autenticación)
pub fn create_public_booking_router() -> Router<AppState> {
    Router::new().route("/", post(create_public_booking))
}

async fn create_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let controller = BookingController::new(state.pool.clone());
    Ok(Json(controller.create_app(user, request).await?))
}

async fn create_walk_in_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let controller = BookingController::new(state.pool.clone());
    Ok(Json(controller.create_walk_in(user, request).await?))
}

async fn create_public_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let controller = BookingController::new(state.pool.clone());
    Ok(Json(controller.create_public(request).await?))
}

async fn list_bookings(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<PagedBookingsResponse>> {
    let controller = BookingController::new(state.pool.clone());
    Ok(Json(controller.list(user, query).await?))
}

async fn get_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let controller = BookingController::new(state.pool.clone());
    Ok(Json(controller.get_by_id(user, id).await?))
}

async fn confirm_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let controller = BookingController::new(state.pool.clone());
    Ok(Json(controller.confirm(user, id).await?))
}

async fn cancel_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let controller = BookingController::new(state.pool.clone());
    Ok(Json(controller.cancel(user, id, request).await?))
}

async fn start_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let controller = BookingController::new(state.pool.clone());
    Ok(Json(controller.start(user, id).await?))
}

async fn complete_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let controller = BookingController::new(state.pool.clone());
    Ok(Json(controller.complete(user, id).await?))
}

async fn delete_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let controller = BookingController::new(state.pool.clone());
    controller.delete(user, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Reserva desactivada exitosamente"
    })))
}
