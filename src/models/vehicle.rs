//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y el dueño como variante
//! etiquetada (usuario registrado o contacto embebido).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Datos de contacto embebidos para dueños sin cuenta registrada
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl OwnerContact {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Dueño de un vehículo
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VehicleOwner {
    Registered { user_id: Uuid },
    Embedded { contact: OwnerContact },
}

/// Fila de la tabla vehicles, columnas paralelas anulables incluidas
#[derive(Debug, Clone, FromRow)]
pub struct VehicleRow {
    pub id: Uuid,
    pub org_id: Option<Uuid>,
    pub owner_user_id: Option<Uuid>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
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

/// Vehicle de dominio
#[derive(Debug, Clone)]
pub struct Vehicle {
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

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        // Si la fila trae ambas formas de dueño, gana la referencia registrada
        let owner = match row.owner_user_id {
            Some(user_id) => Some(VehicleOwner::Registered { user_id }),
            None => {
                let contact = OwnerContact {
                    name: row.owner_name,
                    email: row.owner_email,
                    phone: row.owner_phone,
                };
                if contact.is_empty() {
                    None
                } else {
                    Some(VehicleOwner::Embedded { contact })
                }
            }
        };

        Self {
            id: row.id,
            org_id: row.org_id,
            owner,
            make: row.make,
            model: row.model,
            year: row.year,
            plate: row.plate,
            color: row.color,
            image_url: row.image_url,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Vehicle {
    /// Invariante de visibilidad: el vehículo es visible para un principal
    /// si es su dueño registrado o si comparte organización.
    pub fn is_visible_to(&self, user_id: Uuid, org_id: Option<Uuid>) -> bool {
        let owns = matches!(
            self.owner,
            Some(VehicleOwner::Registered { user_id: owner }) if owner == user_id
        );
        let same_org = match (self.org_id, org_id) {
            (Some(vehicle_org), Some(caller_org)) => vehicle_org == caller_org,
            _ => false,
        };
        owns || same_org
    }

    pub fn owner_user_id(&self) -> Option<Uuid> {
        match &self.owner {
            Some(VehicleOwner::Registered { user_id }) => Some(*user_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(owner_user_id: Option<Uuid>, org_id: Option<Uuid>) -> VehicleRow {
        VehicleRow {
            id: Uuid::new_v4(),
            org_id,
            owner_user_id,
            owner_name: None,
            owner_email: None,
            owner_phone: None,
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2020,
            plate: "AB-123-CD".to_string(),
            color: None,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn visible_to_owner_and_to_same_org() {
        let user = Uuid::new_v4();
        let org = Uuid::new_v4();

        let by_owner = Vehicle::from(row(Some(user), None));
        assert!(by_owner.is_visible_to(user, Some(org)));
        assert!(!by_owner.is_visible_to(Uuid::new_v4(), None));

        let by_org = Vehicle::from(row(Some(Uuid::new_v4()), Some(org)));
        assert!(by_org.is_visible_to(user, Some(org)));
        assert!(!by_org.is_visible_to(user, Some(Uuid::new_v4())));
        assert!(!by_org.is_visible_to(user, None));
    }

    #[test]
    fn registered_owner_wins_over_embedded_contact() {
        let user = Uuid::new_v4();
        let mut r = row(Some(user), None);
        r.owner_name = Some("Juan".to_string());

        let vehicle = Vehicle::from(r);
        assert_eq!(vehicle.owner, Some(VehicleOwner::Registered { user_id: user }));
    }

    #[test]
    fn embedded_contact_without_user_reference() {
        let mut r = row(None, None);
        r.owner_phone = Some("+33612345678".to_string());

        let vehicle = Vehicle::from(r);
        match vehicle.owner {
            Some(VehicleOwner::Embedded { contact }) => {
                assert_eq!(contact.phone.as_deref(), Some("+33612345678"));
            }
            other => panic!("unexpected owner: {:?}", other),
        }
        assert_eq!(Vehicle::from(row(None, None)).owner, None);
    }
}
