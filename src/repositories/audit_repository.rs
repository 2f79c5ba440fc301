//! Repositorio de AuditLog
//!
//! Inserción append-only de entradas de auditoría.

use sqlx::PgPool;

use crate::models::audit_log::NewAuditEntry;
use crate::utils::errors::AppError;

pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: NewAuditEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, actor_user_id, org_id, action, entity_type, entity_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(entry.actor_user_id)
        .bind(entry.org_id)
        .bind(entry.action)
        .bind(entry.entity_type)
        .bind(entry.entity_id)
        .bind(entry.details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
