//! Repositorio de Users
//!
//! Consultas de solo lectura sobre la tabla users.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;
use crate::utils::errors::AppError;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Cuántos de los ids dados corresponden a usuarios activos
    pub async fn count_active_in(&self, ids: &[Uuid]) -> Result<i64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE id = ANY($1) AND is_active = TRUE",
        )
        .bind(ids.to_vec())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
