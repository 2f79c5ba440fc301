//! Repositorio de Bookings
//!
//! Persistencia de reservas. Las variantes etiquetadas del dominio se
//! aplanan a columnas paralelas anulables al escribir y se reconstruyen
//! al leer.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingClient, BookingRow, BookingVehicle};
use crate::utils::errors::AppError;

pub struct BookingRepository {
    pool: PgPool,
}

struct FlatClient {
    user_id: Option<Uuid>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

struct FlatVehicle {
    vehicle_id: Option<Uuid>,
    make: Option<String>,
    model: Option<String>,
    year: Option<i32>,
    plate: Option<String>,
}

fn flatten_client(client: &BookingClient) -> FlatClient {
    match client {
        BookingClient::Registered { user_id } => FlatClient {
            user_id: Some(*user_id),
            name: None,
            email: None,
            phone: None,
        },
        BookingClient::Walkin { contact } => FlatClient {
            user_id: None,
            name: Some(contact.name.clone()),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
        },
    }
}

fn flatten_vehicle(vehicle: Option<&BookingVehicle>) -> FlatVehicle {
    match vehicle {
        Some(BookingVehicle::Registered { vehicle_id }) => FlatVehicle {
            vehicle_id: Some(*vehicle_id),
            make: None,
            model: None,
            year: None,
            plate: None,
        },
        Some(BookingVehicle::Unregistered { info }) => FlatVehicle {
            vehicle_id: None,
            make: Some(info.make.clone()),
            model: Some(info.model.clone()),
            year: info.year,
            plate: info.plate.clone(),
        },
        None => FlatVehicle {
            vehicle_id: None,
            make: None,
            model: None,
            year: None,
            plate: None,
        },
    }
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, booking: &Booking) -> Result<(), AppError> {
        let client = flatten_client(&booking.client);
        let vehicle = flatten_vehicle(booking.vehicle.as_ref());

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, client_user_id, client_name, client_email, client_phone,
                org_id, vehicle_id, vehicle_make, vehicle_model, vehicle_year, vehicle_plate,
                scheduled_date, duration_minutes, status, source, created_by,
                confirmed_by, confirmed_at, cancellation_reason, cancelled_by, cancelled_at,
                completed_at, quotation_id, analysis_id, calendar_event_id,
                notes, internal_notes, is_active, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30
            )
            "#,
        )
        .bind(booking.id)
        .bind(client.user_id)
        .bind(client.name)
        .bind(client.email)
        .bind(client.phone)
        .bind(booking.org_id)
        .bind(vehicle.vehicle_id)
        .bind(vehicle.make)
        .bind(vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.plate)
        .bind(booking.scheduled_date)
        .bind(booking.duration_minutes)
        .bind(booking.status.as_str())
        .bind(booking.source.as_str())
        .bind(booking.created_by)
        .bind(booking.confirmed_by)
        .bind(booking.confirmed_at)
        .bind(booking.cancellation_reason.as_deref())
        .bind(booking.cancelled_by)
        .bind(booking.cancelled_at)
        .bind(booking.completed_at)
        .bind(booking.quotation_id)
        .bind(booking.analysis_id)
        .bind(booking.calendar_event_id.as_deref())
        .bind(booking.notes.as_deref())
        .bind(booking.internal_notes.as_deref())
        .bind(booking.is_active)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Buscar una reserva del taller del caller
    pub async fn find_by_id_for_org(
        &self,
        id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<Booking>, AppError> {
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE id = $1 AND org_id = $2 AND is_active = TRUE",
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    /// Listar reservas del taller, con filtro opcional por estado
    pub async fn list_for_org(
        &self,
        org_id: Uuid,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT * FROM bookings
            WHERE org_id = $1 AND is_active = TRUE
              AND ($2::text IS NULL OR status = $2)
            ORDER BY scheduled_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(org_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    pub async fn count_for_org(
        &self,
        org_id: Uuid,
        status: Option<&str>,
    ) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE org_id = $1 AND is_active = TRUE
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(org_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Persistir los campos de ciclo de vida tras confirm/cancel/complete
    /// o soft-delete. UPDATE de una sola fila; el último escritor gana.
    pub async fn save_lifecycle(&self, booking: &Booking) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = $2,
                confirmed_by = $3,
                confirmed_at = $4,
                cancellation_reason = $5,
                cancelled_by = $6,
                cancelled_at = $7,
                completed_at = $8,
                is_active = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(booking.id)
        .bind(booking.status.as_str())
        .bind(booking.confirmed_by)
        .bind(booking.confirmed_at)
        .bind(booking.cancellation_reason.as_deref())
        .bind(booking.cancelled_by)
        .bind(booking.cancelled_at)
        .bind(booking.completed_at)
        .bind(booking.is_active)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reserva no encontrada".to_string()));
        }

        Ok(())
    }
}
