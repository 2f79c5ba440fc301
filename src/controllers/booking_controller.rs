//! Controller de Bookings
//!
//! Flujos de creación (app, público, walk-in) y transiciones de ciclo de
//! vida de reservas. Las transiciones sellan actor y fecha; el modelo no
//! valida el estado previo.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::booking_dto::{
    BookingListQuery, BookingResponse, CancelBookingRequest, CreateBookingRequest,
    PagedBookingsResponse,
};
use crate::dto::{ApiResponse, Pagination};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::{
    Booking, BookingClient, BookingSource, BookingStatus, BookingVehicle, ClientContact,
    NewBooking, VehicleDescriptor,
};
use crate::repositories::booking_repository::BookingRepository;
use crate::utils::errors::AppError;
use crate::utils::validation::validation_error;

pub struct BookingController {
    bookings: BookingRepository,
}

impl BookingController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            bookings: BookingRepository::new(pool),
        }
    }

    /// Crear una reserva desde la app autenticada
    pub async fn create_app(
        &self,
        user: AuthenticatedUser,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        // El cliente por defecto es el propio caller
        let client = resolve_client(
            request.client_id,
            request.client_info.clone(),
            Some(user.user_id),
        )?;
        let org_id = request
            .org_id
            .or(user.org_id)
            .ok_or_else(|| validation_error("orgId", "El campo 'orgId' es requerido"))?;

        self.persist(request, client, org_id, BookingSource::App, Some(user.user_id))
            .await
    }

    /// Crear una reserva registrada por personal del taller (walk-in)
    pub async fn create_walk_in(
        &self,
        user: AuthenticatedUser,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let client = resolve_client(request.client_id, request.client_info.clone(), None)?;
        let org_id = user
            .org_id
            .or(request.org_id)
            .ok_or_else(|| validation_error("orgId", "El campo 'orgId' es requerido"))?;

        self.persist(
            request,
            client,
            org_id,
            BookingSource::WalkIn,
            Some(user.user_id),
        )
        .await
    }

    /// Crear una reserva desde el flujo público, sin principal
    pub async fn create_public(
        &self,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let contact = request.client_info.clone().ok_or_else(|| {
            validation_error("clientInfo", "El campo 'clientInfo' es requerido")
        })?;
        let client = BookingClient::Walkin { contact };
        let org_id = request
            .org_id
            .ok_or_else(|| validation_error("orgId", "El campo 'orgId' es requerido"))?;

        self.persist(request, client, org_id, BookingSource::PublicBooking, None)
            .await
    }

    async fn persist(
        &self,
        request: CreateBookingRequest,
        client: BookingClient,
        org_id: Uuid,
        source: BookingSource,
        created_by: Option<Uuid>,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let now = Utc::now();
        let booking = Booking::create(
            NewBooking {
                client,
                org_id,
                vehicle: resolve_vehicle(request.vehicle_id, request.vehicle_info),
                scheduled_date: request.scheduled_date,
                duration_minutes: request.duration_minutes,
                source,
                created_by,
                notes: request.notes,
                internal_notes: request.internal_notes,
                quotation_id: request.quotation_id,
                analysis_id: request.analysis_id,
                calendar_event_id: request.calendar_event_id,
            },
            now,
        )?;

        self.bookings.insert(&booking).await?;
        info!("Reserva {} creada ({})", booking.id, booking.source.as_str());

        Ok(ApiResponse::success_with_message(
            BookingResponse::from_booking(booking, now),
            "Reserva creada exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let org_id = require_org(&user)?;
        let booking = self
            .bookings
            .find_by_id_for_org(id, org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        Ok(ApiResponse::success(BookingResponse::from_booking(
            booking,
            Utc::now(),
        )))
    }

    pub async fn list(
        &self,
        user: AuthenticatedUser,
        query: BookingListQuery,
    ) -> Result<PagedBookingsResponse, AppError> {
        let org_id = require_org(&user)?;
        let pagination = Pagination::from_raw(query.page.as_deref(), query.limit.as_deref());

        let status = match query.status.as_deref() {
            Some(raw) => Some(
                BookingStatus::parse(raw)
                    .ok_or_else(|| validation_error("status", "Estado de reserva desconocido"))?,
            ),
            None => None,
        };
        let status_str = status.map(|s| s.as_str());

        let bookings = self
            .bookings
            .list_for_org(org_id, status_str, pagination.limit, pagination.offset())
            .await?;
        let total = self.bookings.count_for_org(org_id, status_str).await?;

        let now = Utc::now();
        Ok(PagedBookingsResponse {
            success: true,
            data: bookings
                .into_iter()
                .map(|b| BookingResponse::from_booking(b, now))
                .collect(),
            total,
            page: pagination.page,
            limit: pagination.limit,
            pages: pagination.pages(total),
        })
    }

    pub async fn confirm(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let org_id = require_org(&user)?;
        let mut booking = self
            .bookings
            .find_by_id_for_org(id, org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let now = Utc::now();
        booking.confirm(user.user_id, now);
        self.bookings.save_lifecycle(&booking).await?;

        Ok(ApiResponse::success_with_message(
            BookingResponse::from_booking(booking, now),
            "Reserva confirmada".to_string(),
        ))
    }

    pub async fn cancel(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
        request: CancelBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let org_id = require_org(&user)?;
        let mut booking = self
            .bookings
            .find_by_id_for_org(id, org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let now = Utc::now();
        booking.cancel(Some(user.user_id), request.reason, now);
        self.bookings.save_lifecycle(&booking).await?;

        Ok(ApiResponse::success_with_message(
            BookingResponse::from_booking(booking, now),
            "Reserva cancelada".to_string(),
        ))
    }

    pub async fn start(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let org_id = require_org(&user)?;
        let mut booking = self
            .bookings
            .find_by_id_for_org(id, org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let now = Utc::now();
        booking.start(now);
        self.bookings.save_lifecycle(&booking).await?;

        Ok(ApiResponse::success_with_message(
            BookingResponse::from_booking(booking, now),
            "Reserva en curso".to_string(),
        ))
    }

    pub async fn complete(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let org_id = require_org(&user)?;
        let mut booking = self
            .bookings
            .find_by_id_for_org(id, org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let now = Utc::now();
        booking.complete(now);
        self.bookings.save_lifecycle(&booking).await?;

        Ok(ApiResponse::success_with_message(
            BookingResponse::from_booking(booking, now),
            "Reserva completada".to_string(),
        ))
    }

    /// Soft-delete: las reservas nunca se eliminan físicamente
    pub async fn delete(&self, user: AuthenticatedUser, id: Uuid) -> Result<(), AppError> {
        let org_id = require_org(&user)?;
        let mut booking = self
            .bookings
            .find_by_id_for_org(id, org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        booking.deactivate(Utc::now());
        self.bookings.save_lifecycle(&booking).await
    }
}

fn require_org(user: &AuthenticatedUser) -> Result<Uuid, AppError> {
    user.org_id.ok_or_else(|| {
        AppError::BadRequest("El usuario no pertenece a ninguna organización".to_string())
    })
}

/// Resolver el cliente: referencia registrada, contacto embebido o fallback
fn resolve_client(
    client_id: Option<Uuid>,
    client_info: Option<ClientContact>,
    fallback_user: Option<Uuid>,
) -> Result<BookingClient, AppError> {
    if let Some(user_id) = client_id {
        return Ok(BookingClient::Registered { user_id });
    }
    if let Some(contact) = client_info {
        return Ok(BookingClient::Walkin { contact });
    }
    if let Some(user_id) = fallback_user {
        return Ok(BookingClient::Registered { user_id });
    }
    Err(validation_error(
        "clientInfo",
        "Se requiere 'clientId' o 'clientInfo'",
    ))
}

fn resolve_vehicle(
    vehicle_id: Option<Uuid>,
    vehicle_info: Option<VehicleDescriptor>,
) -> Option<BookingVehicle> {
    if let Some(vehicle_id) = vehicle_id {
        return Some(BookingVehicle::Registered { vehicle_id });
    }
    vehicle_info.map(|info| BookingVehicle::Unregistered { info })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_reference_wins_over_embedded_contact() {
        let user = Uuid::new_v4();
        let client = resolve_client(
            Some(user),
            Some(ClientContact {
                name: "ignored".to_string(),
                email: None,
                phone: None,
            }),
            None,
        )
        .unwrap();
        assert_eq!(client, BookingClient::Registered { user_id: user });
    }

    #[test]
    fn app_flow_falls_back_to_the_caller() {
        let caller = Uuid::new_v4();
        let client = resolve_client(None, None, Some(caller)).unwrap();
        assert_eq!(client, BookingClient::Registered { user_id: caller });
    }

    #[test]
    fn walk_in_without_client_data_is_rejected() {
        assert!(resolve_client(None, None, None).is_err());
    }

    #[test]
    fn vehicle_resolution_prefers_registered_reference() {
        let vehicle = Uuid::new_v4();
        let resolved = resolve_vehicle(
            Some(vehicle),
            Some(VehicleDescriptor {
                make: "Fiat".to_string(),
                model: "Panda".to_string(),
                year: None,
                plate: None,
            }),
        );
        assert_eq!(
            resolved,
            Some(BookingVehicle::Registered {
                vehicle_id: vehicle
            })
        );
        assert_eq!(resolve_vehicle(None, None), None);
    }
}
