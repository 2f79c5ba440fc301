//! Modelo de AuditLog
//!
//! Registro append-only de acciones relevantes del sistema.

use serde_json::Value;
use uuid::Uuid;

/// Entrada nueva de auditoría; id y created_at los asigna la base de datos
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_user_id: Uuid,
    pub org_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub details: Value,
}
