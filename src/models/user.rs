//! Modelo de User
//!
//! Entidad de solo lectura en este servicio: se resuelve para dar forma a
//! listados, métricas y el roster de clientes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub org_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
