//! Utilidades de validación
//!
//! Funciones helper para validación de datos y construcción
//! de errores de validación con el campo que falló.

use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::utils::errors::AppError;

/// Construir un error de validación para un campo concreto
pub fn validation_error(field: &'static str, message: &str) -> AppError {
    let mut error = ValidationError::new("custom");
    error.message = Some(std::borrow::Cow::Owned(message.to_string()));

    let mut errors = ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Validar y convertir string a UUID, nombrando el campo si falla
pub fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value)
        .map_err(|_| validation_error(field, &format!("El campo '{}' no es un id válido", field)))
}

/// Validar que un string no esté vacío
pub fn require_non_empty(field: &'static str, value: Option<&str>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(validation_error(
            field,
            &format!("El campo '{}' es requerido", field),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uuid_rejects_garbage() {
        assert!(parse_uuid("vehicleId", "not-a-uuid").is_err());
        assert!(parse_uuid("vehicleId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
    }

    #[test]
    fn require_non_empty_rejects_missing_and_blank() {
        assert!(require_non_empty("make", None).is_err());
        assert!(require_non_empty("make", Some("   ")).is_err());
        assert_eq!(require_non_empty("make", Some(" Toyota ")).unwrap(), "Toyota");
    }
}
