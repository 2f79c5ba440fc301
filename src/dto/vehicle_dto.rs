//! DTOs de Vehicle
//!
//! Requests y responses de los endpoints de vehículos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vehicle::{Vehicle, VehicleOwner};

/// Año recibido como número JSON o como texto numérico
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YearField {
    Number(i64),
    Text(String),
}

impl YearField {
    /// Devuelve el año solo si el valor es numérico
    pub fn as_year(&self) -> Option<i32> {
        match self {
            YearField::Number(n) => i32::try_from(*n).ok(),
            YearField::Text(s) => s.trim().parse::<i32>().ok(),
        }
    }
}

/// Request de generación de imagen
///
/// Todos los campos llegan opcionales: la validación nombra el primer
/// campo que falte en lugar de rechazar el body completo al deserializar.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    pub vehicle_id: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<YearField>,
    pub color: Option<String>,
}

/// Data de la response de generación de imagen
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImageData {
    pub vehicle_id: Uuid,
    pub image_url: String,
}

/// Query-params del listado de vehículos
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub owner_id: Option<Uuid>,
}

/// Query-params del sub-flujo de prefill de reservas
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOptionsQuery {
    pub owner_id: Option<Uuid>,
}

/// Proyección enriquecida para listados
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListItem {
    pub name: String,
    pub registration_no: String,
    pub car_type: String,
    pub email: Option<String>,
    pub status: String,
    pub vehicle_id: Uuid,
    pub owner_id: Option<Uuid>,
}

/// Proyección mínima para formularios de reserva
#[derive(Debug, Serialize)]
pub struct BookingOptionItem {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub plate: String,
}

impl From<&Vehicle> for BookingOptionItem {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            plate: vehicle.plate.clone(),
        }
    }
}

/// Response paginada de listados
#[derive(Debug, Serialize)]
pub struct PagedVehiclesResponse {
    pub success: bool,
    pub data: Vec<VehicleListItem>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

/// Métricas agregadas del dashboard
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsData {
    pub total_cars: i64,
    pub active_cars: i64,
    pub total_users: i64,
    pub active_users: i64,
    pub change_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub success: bool,
    pub data: MetricsData,
}

/// Entrada del roster de clientes
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientEntry {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub client_type: String,
}

#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    pub success: bool,
    pub data: Vec<ClientEntry>,
    pub total: usize,
}

/// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100, message = "El campo 'make' es requerido"))]
    pub make: String,

    #[validate(length(min = 1, max = 100, message = "El campo 'model' es requerido"))]
    pub model: String,

    #[validate(range(min = 1900, max = 2100, message = "El campo 'year' está fuera de rango"))]
    pub year: i32,

    #[validate(length(min = 1, max = 20, message = "El campo 'plate' es requerido"))]
    pub plate: String,

    pub color: Option<String>,

    pub owner_user_id: Option<Uuid>,
    pub owner_name: Option<String>,
    #[validate(email(message = "El campo 'ownerEmail' no es un email válido"))]
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,

    #[validate(length(min = 1, max = 20))]
    pub plate: Option<String>,

    pub color: Option<String>,
}

/// Response de detalle de vehículo
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResponse {
    pub id: Uuid,
    pub org_id: Option<Uuid>,
    pub owner: Option<VehicleOwner>,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub plate: String,
    pub color: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            org_id: vehicle.org_id,
            owner: vehicle.owner,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            plate: vehicle.plate,
            color: vehicle.color,
            image_url: vehicle.image_url,
            is_active: vehicle.is_active,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_field_accepts_number_and_numeric_text() {
        assert_eq!(YearField::Number(2020).as_year(), Some(2020));
        assert_eq!(YearField::Text("2020".to_string()).as_year(), Some(2020));
        assert_eq!(YearField::Text(" 2020 ".to_string()).as_year(), Some(2020));
        assert_eq!(YearField::Text("veinte".to_string()).as_year(), None);
    }

    #[test]
    fn generate_image_request_tolerates_missing_fields() {
        let req: GenerateImageRequest = serde_json::from_str(r#"{"make": "Peugeot"}"#).unwrap();
        assert_eq!(req.make.as_deref(), Some("Peugeot"));
        assert!(req.vehicle_id.is_none());
        assert!(req.year.is_none());

        let req: GenerateImageRequest =
            serde_json::from_str(r#"{"year": "2019", "color": "rojo"}"#).unwrap();
        assert_eq!(req.year.unwrap().as_year(), Some(2019));
    }
}
