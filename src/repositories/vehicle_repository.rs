//! Repositorio de Vehicles
//!
//! Capa de consultas con alcance por principal: un vehículo es visible si el
//! caller es su dueño registrado o si comparte organización. Todos los
//! filtros de este módulo parten de ese invariante.

use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::auth::AuthenticatedUser;
use crate::models::vehicle::{Vehicle, VehicleRow};
use crate::utils::errors::AppError;

/// Alcance de acceso derivado del principal autenticado
#[derive(Debug, Clone, Copy)]
pub struct AccessScope {
    pub user_id: Uuid,
    pub org_id: Option<Uuid>,
}

impl From<&AuthenticatedUser> for AccessScope {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id,
            org_id: user.org_id,
        }
    }
}

/// Fila de vehículo con el dueño registrado resuelto (LEFT JOIN users)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VehicleWithOwnerRow {
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
    pub user_full_name: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub user_is_active: Option<bool>,
}

const VEHICLE_WITH_OWNER_SELECT: &str = r#"
    SELECT v.id, v.org_id, v.owner_user_id, v.owner_name, v.owner_email, v.owner_phone,
           v.make, v.model, v.year, v.plate, v.color, v.image_url, v.is_active,
           u.full_name AS user_full_name, u.email AS user_email,
           u.phone AS user_phone, u.is_active AS user_is_active
    FROM vehicles v
    LEFT JOIN users u ON u.id = v.owner_user_id
"#;

// Filtro base de visibilidad: dueño registrado u organización del caller.
// $2 es NULL cuando el caller no tiene organización.
const SCOPE_WHERE: &str =
    "(v.owner_user_id = $1 OR ($2::uuid IS NOT NULL AND v.org_id = $2))";

// Búsqueda por substring, case-insensitive, sobre matrícula, marca, modelo
// y nombre embebido del dueño. $3 es NULL cuando no hay término de búsqueda.
const SEARCH_WHERE: &str = r#"($3::text IS NULL
        OR v.plate ILIKE $3 OR v.make ILIKE $3
        OR v.model ILIKE $3 OR v.owner_name ILIKE $3)"#;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn search_pattern(search: Option<&str>) -> Option<String> {
        search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s))
    }

    /// Listar vehículos visibles para el caller, con el dueño resuelto
    pub async fn list_scoped(
        &self,
        scope: &AccessScope,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VehicleWithOwnerRow>, AppError> {
        let sql = format!(
            "{} WHERE {} AND {} ORDER BY v.created_at DESC LIMIT $4 OFFSET $5",
            VEHICLE_WITH_OWNER_SELECT, SCOPE_WHERE, SEARCH_WHERE
        );

        let rows = sqlx::query_as::<_, VehicleWithOwnerRow>(&sql)
            .bind(scope.user_id)
            .bind(scope.org_id)
            .bind(Self::search_pattern(search))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Conteo total con el mismo filtro que el listado
    pub async fn count_scoped(
        &self,
        scope: &AccessScope,
        search: Option<&str>,
    ) -> Result<i64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) FROM vehicles v WHERE {} AND {}",
            SCOPE_WHERE, SEARCH_WHERE
        );

        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(scope.user_id)
            .bind(scope.org_id)
            .bind(Self::search_pattern(search))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Vehículos de un dueño concreto (prefill del formulario de reserva).
    /// Este filtro REEMPLAZA al de visibilidad: dueño exacto, restringido a
    /// la organización del caller cuando éste tiene una.
    pub async fn list_for_owner(
        &self,
        owner_id: Uuid,
        caller_org: Option<Uuid>,
    ) -> Result<Vec<Vehicle>, AppError> {
        let rows = sqlx::query_as::<_, VehicleRow>(
            r#"
            SELECT * FROM vehicles v
            WHERE v.owner_user_id = $1
              AND ($2::uuid IS NULL OR v.org_id = $2)
            ORDER BY v.created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(caller_org)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    /// Igual que `list_for_owner`, pero con el dueño registrado resuelto
    /// para la proyección enriquecida del listado
    pub async fn list_for_owner_with_owner(
        &self,
        owner_id: Uuid,
        caller_org: Option<Uuid>,
    ) -> Result<Vec<VehicleWithOwnerRow>, AppError> {
        let sql = format!(
            "{} WHERE v.owner_user_id = $1 AND ($2::uuid IS NULL OR v.org_id = $2)
             ORDER BY v.created_at DESC",
            VEHICLE_WITH_OWNER_SELECT
        );

        let rows = sqlx::query_as::<_, VehicleWithOwnerRow>(&sql)
            .bind(owner_id)
            .bind(caller_org)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Resolver un vehículo por id dentro del alcance del caller.
    /// Un id inexistente y un id inaccesible son indistinguibles aquí.
    pub async fn find_by_id_scoped(
        &self,
        scope: &AccessScope,
        id: Uuid,
    ) -> Result<Option<Vehicle>, AppError> {
        let sql = format!(
            "SELECT * FROM vehicles v WHERE v.id = $3 AND {}",
            SCOPE_WHERE
        );

        let row = sqlx::query_as::<_, VehicleRow>(&sql)
            .bind(scope.user_id)
            .bind(scope.org_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Vehicle::from))
    }

    /// Vehículos activos de una organización, con el dueño resuelto (roster)
    pub async fn list_active_for_org(
        &self,
        org_id: Uuid,
    ) -> Result<Vec<VehicleWithOwnerRow>, AppError> {
        let sql = format!(
            "{} WHERE v.org_id = $1 AND v.is_active = TRUE ORDER BY v.created_at DESC",
            VEHICLE_WITH_OWNER_SELECT
        );

        let rows = sqlx::query_as::<_, VehicleWithOwnerRow>(&sql)
            .bind(org_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Ids distintos de dueños registrados entre los vehículos visibles
    pub async fn distinct_owner_ids(&self, scope: &AccessScope) -> Result<Vec<Uuid>, AppError> {
        let sql = format!(
            "SELECT DISTINCT v.owner_user_id FROM vehicles v
             WHERE {} AND v.owner_user_id IS NOT NULL",
            SCOPE_WHERE
        );

        let rows: Vec<(Option<Uuid>,)> = sqlx::query_as(&sql)
            .bind(scope.user_id)
            .bind(scope.org_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().filter_map(|(id,)| id).collect())
    }

    /// Conteo de vehículos visibles, opcionalmente solo activos
    pub async fn count_scoped_active(
        &self,
        scope: &AccessScope,
        only_active: bool,
    ) -> Result<i64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) FROM vehicles v WHERE {} AND ($3::bool = FALSE OR v.is_active = TRUE)",
            SCOPE_WHERE
        );

        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(scope.user_id)
            .bind(scope.org_id)
            .bind(only_active)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Crear un vehículo para la organización del caller
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        org_id: Option<Uuid>,
        owner_user_id: Option<Uuid>,
        owner_name: Option<String>,
        owner_email: Option<String>,
        owner_phone: Option<String>,
        make: String,
        model: String,
        year: i32,
        plate: String,
        color: Option<String>,
    ) -> Result<Vehicle, AppError> {
        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            INSERT INTO vehicles (
                id, org_id, owner_user_id, owner_name, owner_email, owner_phone,
                make, model, year, plate, color, image_url, is_active,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NULL, TRUE, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(org_id)
        .bind(owner_user_id)
        .bind(owner_name)
        .bind(owner_email)
        .bind(owner_phone)
        .bind(make)
        .bind(model)
        .bind(year)
        .bind(plate)
        .bind(color)
        .fetch_one(&self.pool)
        .await?;

        Ok(Vehicle::from(row))
    }

    /// Actualización parcial de un vehículo dentro del alcance del caller
    pub async fn update(
        &self,
        scope: &AccessScope,
        id: Uuid,
        make: Option<String>,
        model: Option<String>,
        year: Option<i32>,
        plate: Option<String>,
        color: Option<String>,
    ) -> Result<Vehicle, AppError> {
        self.find_by_id_scoped(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            UPDATE vehicles SET
                make = COALESCE($2, make),
                model = COALESCE($3, model),
                year = COALESCE($4, year),
                plate = COALESCE($5, plate),
                color = COALESCE($6, color),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(make)
        .bind(model)
        .bind(year)
        .bind(plate)
        .bind(color)
        .fetch_one(&self.pool)
        .await?;

        Ok(Vehicle::from(row))
    }

    /// Soft-delete dentro del alcance del caller
    pub async fn soft_delete(&self, scope: &AccessScope, id: Uuid) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE vehicles v SET is_active = FALSE, updated_at = NOW()
             WHERE v.id = $3 AND {}",
            SCOPE_WHERE
        );

        let result = sqlx::query(&sql)
            .bind(scope.user_id)
            .bind(scope.org_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehículo no encontrado".to_string()));
        }

        Ok(())
    }

    /// Persistir la referencia de imagen generada (UPDATE de una sola fila)
    pub async fn set_image_url(&self, id: Uuid, image_url: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE vehicles SET image_url = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(image_url)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
