//! DTOs de Booking
//!
//! Requests y responses de los endpoints de reservas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::booking::{
    Booking, BookingClient, BookingSource, BookingStatus, BookingVehicle, ClientContact,
    VehicleDescriptor,
};

/// Request para crear una reserva (flujos app, público y walk-in)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub client_id: Option<Uuid>,
    pub client_info: Option<ClientContact>,
    pub org_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub vehicle_info: Option<VehicleDescriptor>,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
    pub quotation_id: Option<Uuid>,
    pub analysis_id: Option<Uuid>,
    pub calendar_event_id: Option<String>,
}

/// Request de cancelación
#[derive(Debug, Deserialize)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

/// Query-params del listado de reservas
#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

/// Response de detalle de reserva
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub client: BookingClient,
    pub org_id: Uuid,
    pub vehicle: Option<BookingVehicle>,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: BookingStatus,
    pub source: BookingSource,
    pub created_by: Option<Uuid>,
    pub confirmed_by: Option<Uuid>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub quotation_id: Option<Uuid>,
    pub analysis_id: Option<Uuid>,
    pub calendar_event_id: Option<String>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
    pub is_active: bool,
    // Propiedades derivadas, nunca almacenadas
    pub is_upcoming: bool,
    pub is_past: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingResponse {
    pub fn from_booking(booking: Booking, now: DateTime<Utc>) -> Self {
        let is_upcoming = booking.is_upcoming(now);
        let is_past = booking.is_past(now);
        Self {
            id: booking.id,
            client: booking.client,
            org_id: booking.org_id,
            vehicle: booking.vehicle,
            scheduled_date: booking.scheduled_date,
            duration_minutes: booking.duration_minutes,
            status: booking.status,
            source: booking.source,
            created_by: booking.created_by,
            confirmed_by: booking.confirmed_by,
            confirmed_at: booking.confirmed_at,
            cancellation_reason: booking.cancellation_reason,
            cancelled_by: booking.cancelled_by,
            cancelled_at: booking.cancelled_at,
            completed_at: booking.completed_at,
            quotation_id: booking.quotation_id,
            analysis_id: booking.analysis_id,
            calendar_event_id: booking.calendar_event_id,
            notes: booking.notes,
            internal_notes: booking.internal_notes,
            is_active: booking.is_active,
            is_upcoming,
            is_past,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Response paginada de reservas
#[derive(Debug, Serialize)]
pub struct PagedBookingsResponse {
    pub success: bool,
    pub data: Vec<BookingResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}
