//! Modelo de Booking
//!
//! Representa una visita de servicio agendada en un taller. El cliente y el
//! vehículo pueden ser referencias registradas o datos embebidos para
//! reservas públicas / walk-in, modelados como variantes etiquetadas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::AppError;
use crate::utils::validation::validation_error;

/// Duración por defecto de una visita, en minutos
pub const DEFAULT_DURATION_MINUTES: i32 = 60;
/// Duración mínima aceptada
pub const MIN_DURATION_MINUTES: i32 = 15;
/// Longitud máxima de las notas
pub const MAX_NOTES_LEN: usize = 1000;

/// Estado de la reserva
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// Origen de la reserva
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    App,
    PublicBooking,
    WalkIn,
}

impl BookingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSource::App => "app",
            BookingSource::PublicBooking => "public_booking",
            BookingSource::WalkIn => "walk_in",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "app" => Some(BookingSource::App),
            "public_booking" => Some(BookingSource::PublicBooking),
            "walk_in" => Some(BookingSource::WalkIn),
            _ => None,
        }
    }
}

/// Contacto embebido de un cliente sin cuenta
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientContact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Cliente de la reserva: usuario registrado o contacto embebido
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingClient {
    Registered { user_id: Uuid },
    Walkin { contact: ClientContact },
}

/// Descripción embebida de un vehículo sin registrar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleDescriptor {
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub plate: Option<String>,
}

/// Vehículo de la reserva: referencia registrada o descripción embebida
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingVehicle {
    Registered { vehicle_id: Uuid },
    Unregistered { info: VehicleDescriptor },
}

/// Parámetros para crear una reserva
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub client: BookingClient,
    pub org_id: Uuid,
    pub vehicle: Option<BookingVehicle>,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub source: BookingSource,
    pub created_by: Option<Uuid>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
    pub quotation_id: Option<Uuid>,
    pub analysis_id: Option<Uuid>,
    pub calendar_event_id: Option<String>,
}

/// Booking de dominio
#[derive(Debug, Clone)]
pub struct Booking {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Crear una reserva validando las restricciones del modelo
    pub fn create(new: NewBooking, now: DateTime<Utc>) -> Result<Self, AppError> {
        let duration = new.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if duration < MIN_DURATION_MINUTES {
            return Err(validation_error(
                "durationMinutes",
                &format!("La duración mínima es de {} minutos", MIN_DURATION_MINUTES),
            ));
        }

        check_notes_len("notes", new.notes.as_deref())?;
        check_notes_len("internalNotes", new.internal_notes.as_deref())?;

        if let BookingClient::Walkin { contact } = &new.client {
            if contact.name.trim().is_empty() {
                return Err(validation_error(
                    "clientInfo",
                    "El nombre del cliente es requerido",
                ));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            client: new.client,
            org_id: new.org_id,
            vehicle: new.vehicle,
            scheduled_date: new.scheduled_date,
            duration_minutes: duration,
            status: BookingStatus::Pending,
            source: new.source,
            created_by: new.created_by,
            confirmed_by: None,
            confirmed_at: None,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            completed_at: None,
            quotation_id: new.quotation_id,
            analysis_id: new.analysis_id,
            calendar_event_id: new.calendar_event_id,
            notes: new.notes,
            internal_notes: new.internal_notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// La cita está en el futuro y no fue cancelada
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_date > now && self.status != BookingStatus::Cancelled
    }

    /// La cita ya pasó, sin importar el estado
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_date < now
    }

    // Las transiciones de estado no están protegidas: cada método sella sus
    // campos de actor/fecha y sobrescribe el estado anterior.

    pub fn confirm(&mut self, actor: Uuid, now: DateTime<Utc>) {
        self.status = BookingStatus::Confirmed;
        self.confirmed_by = Some(actor);
        self.confirmed_at = Some(now);
        self.updated_at = now;
    }

    pub fn cancel(&mut self, actor: Option<Uuid>, reason: Option<String>, now: DateTime<Utc>) {
        self.status = BookingStatus::Cancelled;
        self.cancelled_by = actor;
        self.cancellation_reason = reason;
        self.cancelled_at = Some(now);
        self.updated_at = now;
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.status = BookingStatus::InProgress;
        self.updated_at = now;
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = BookingStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Soft-delete: las reservas nunca se eliminan físicamente
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn client_user_id(&self) -> Option<Uuid> {
        match &self.client {
            BookingClient::Registered { user_id } => Some(*user_id),
            BookingClient::Walkin { .. } => None,
        }
    }

    pub fn vehicle_id(&self) -> Option<Uuid> {
        match &self.vehicle {
            Some(BookingVehicle::Registered { vehicle_id }) => Some(*vehicle_id),
            _ => None,
        }
    }
}

fn check_notes_len(field: &'static str, value: Option<&str>) -> Result<(), AppError> {
    if let Some(text) = value {
        if text.chars().count() > MAX_NOTES_LEN {
            return Err(validation_error(
                field,
                &format!("Las notas no pueden superar {} caracteres", MAX_NOTES_LEN),
            ));
        }
    }
    Ok(())
}

/// Fila de la tabla bookings
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub client_user_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub org_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_year: Option<i32>,
    pub vehicle_plate: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: String,
    pub source: String,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        // La referencia registrada gana sobre el contacto embebido
        let client = match row.client_user_id {
            Some(user_id) => BookingClient::Registered { user_id },
            None => BookingClient::Walkin {
                contact: ClientContact {
                    name: row.client_name.unwrap_or_default(),
                    email: row.client_email,
                    phone: row.client_phone,
                },
            },
        };

        let vehicle = match (row.vehicle_id, row.vehicle_make, row.vehicle_model) {
            (Some(vehicle_id), _, _) => Some(BookingVehicle::Registered { vehicle_id }),
            (None, Some(make), Some(model)) => Some(BookingVehicle::Unregistered {
                info: VehicleDescriptor {
                    make,
                    model,
                    year: row.vehicle_year,
                    plate: row.vehicle_plate,
                },
            }),
            _ => None,
        };

        Self {
            id: row.id,
            client,
            org_id: row.org_id,
            vehicle,
            scheduled_date: row.scheduled_date,
            duration_minutes: row.duration_minutes,
            status: BookingStatus::parse(&row.status).unwrap_or(BookingStatus::Pending),
            source: BookingSource::parse(&row.source).unwrap_or(BookingSource::App),
            created_by: row.created_by,
            confirmed_by: row.confirmed_by,
            confirmed_at: row.confirmed_at,
            cancellation_reason: row.cancellation_reason,
            cancelled_by: row.cancelled_by,
            cancelled_at: row.cancelled_at,
            completed_at: row.completed_at,
            quotation_id: row.quotation_id,
            analysis_id: row.analysis_id,
            calendar_event_id: row.calendar_event_id,
            notes: row.notes,
            internal_notes: row.internal_notes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_booking(scheduled: DateTime<Utc>) -> NewBooking {
        NewBooking {
            client: BookingClient::Registered {
                user_id: Uuid::new_v4(),
            },
            org_id: Uuid::new_v4(),
            vehicle: None,
            scheduled_date: scheduled,
            duration_minutes: None,
            source: BookingSource::App,
            created_by: Some(Uuid::new_v4()),
            notes: None,
            internal_notes: None,
            quotation_id: None,
            analysis_id: None,
            calendar_event_id: None,
        }
    }

    #[test]
    fn duration_below_minimum_is_rejected() {
        let now = Utc::now();
        let mut new = new_booking(now + Duration::hours(2));
        new.duration_minutes = Some(10);
        assert!(Booking::create(new, now).is_err());
    }

    #[test]
    fn duration_defaults_to_sixty_minutes() {
        let now = Utc::now();
        let booking = Booking::create(new_booking(now + Duration::hours(2)), now).unwrap();
        assert_eq!(booking.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.is_active);
    }

    #[test]
    fn notes_above_limit_are_rejected() {
        let now = Utc::now();
        let mut new = new_booking(now + Duration::hours(2));
        new.notes = Some("x".repeat(MAX_NOTES_LEN + 1));
        assert!(Booking::create(new, now).is_err());

        let mut new = new_booking(now + Duration::hours(2));
        new.notes = Some("x".repeat(MAX_NOTES_LEN));
        assert!(Booking::create(new, now).is_ok());
    }

    #[test]
    fn walkin_client_requires_a_name() {
        let now = Utc::now();
        let mut new = new_booking(now + Duration::hours(2));
        new.client = BookingClient::Walkin {
            contact: ClientContact {
                name: "  ".to_string(),
                email: None,
                phone: Some("+33612345678".to_string()),
            },
        };
        assert!(Booking::create(new, now).is_err());
    }

    #[test]
    fn upcoming_becomes_false_once_date_passes() {
        let now = Utc::now();
        let booking = Booking::create(new_booking(now + Duration::hours(1)), now).unwrap();

        assert!(booking.is_upcoming(now));
        assert!(!booking.is_past(now));

        // Aún pending, pero la fecha ya pasó
        let later = now + Duration::hours(2);
        assert!(!booking.is_upcoming(later));
        assert!(booking.is_past(later));
    }

    #[test]
    fn cancelled_booking_is_never_upcoming() {
        let now = Utc::now();
        let mut booking = Booking::create(new_booking(now + Duration::hours(3)), now).unwrap();
        booking.cancel(None, Some("cliente no disponible".to_string()), now);

        assert!(!booking.is_upcoming(now));
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(
            booking.cancellation_reason.as_deref(),
            Some("cliente no disponible")
        );
        assert!(booking.cancelled_at.is_some());
    }

    #[test]
    fn confirm_and_complete_stamp_their_fields() {
        let now = Utc::now();
        let actor = Uuid::new_v4();
        let mut booking = Booking::create(new_booking(now + Duration::hours(3)), now).unwrap();

        booking.confirm(actor, now);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.confirmed_by, Some(actor));
        assert_eq!(booking.confirmed_at, Some(now));

        booking.complete(now);
        assert_eq!(booking.status, BookingStatus::Completed);
        assert_eq!(booking.completed_at, Some(now));
    }

    #[test]
    fn transitions_are_not_guarded() {
        // El modelo no valida transiciones: completed puede volver a confirmarse
        let now = Utc::now();
        let mut booking = Booking::create(new_booking(now + Duration::hours(3)), now).unwrap();
        booking.complete(now);
        booking.confirm(Uuid::new_v4(), now);
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[test]
    fn row_roundtrip_prefers_registered_references() {
        let user = Uuid::new_v4();
        let now = Utc::now();
        let row = BookingRow {
            id: Uuid::new_v4(),
            client_user_id: Some(user),
            client_name: Some("ignored".to_string()),
            client_email: None,
            client_phone: None,
            org_id: Uuid::new_v4(),
            vehicle_id: None,
            vehicle_make: Some("Renault".to_string()),
            vehicle_model: Some("Clio".to_string()),
            vehicle_year: Some(2018),
            vehicle_plate: None,
            scheduled_date: now,
            duration_minutes: 45,
            status: "confirmed".to_string(),
            source: "walk_in".to_string(),
            created_by: None,
            confirmed_by: None,
            confirmed_at: None,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            completed_at: None,
            quotation_id: None,
            analysis_id: None,
            calendar_event_id: None,
            notes: None,
            internal_notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let booking = Booking::from(row);
        assert_eq!(booking.client, BookingClient::Registered { user_id: user });
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.source, BookingSource::WalkIn);
        match booking.vehicle {
            Some(BookingVehicle::Unregistered { info }) => assert_eq!(info.make, "Renault"),
            other => panic!("unexpected vehicle: {:?}", other),
        }
    }
}
