//! DTOs de la API
//!
//! Formas de request/response compartidas entre rutas y controllers.

pub mod booking_dto;
pub mod vehicle_dto;

use serde::Serialize;

/// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

/// Parámetros de paginación, 1-based
///
/// Los valores llegan como texto y se coaccionan numéricamente en silencio,
/// igual que hace el resto del sistema con estos parámetros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_LIMIT: i64 = 10;

    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(Self::DEFAULT_PAGE);
        let limit = limit
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(Self::DEFAULT_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Número total de páginas para un conteo dado
    pub fn pages(&self, total: i64) -> i64 {
        if total == 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_coercion() {
        assert_eq!(
            Pagination::from_raw(None, None),
            Pagination { page: 1, limit: 10 }
        );
        // Basura numérica se coacciona en silencio a los defaults
        assert_eq!(
            Pagination::from_raw(Some("abc"), Some("-3")),
            Pagination { page: 1, limit: 10 }
        );
        assert_eq!(
            Pagination::from_raw(Some("2"), Some("5")),
            Pagination { page: 2, limit: 5 }
        );
    }

    #[test]
    fn page_two_of_twelve_records_with_limit_five() {
        let p = Pagination::from_raw(Some("2"), Some("5"));
        assert_eq!(p.offset(), 5);
        assert_eq!(p.pages(12), 3);
    }

    #[test]
    fn zero_records_means_zero_pages() {
        let p = Pagination::from_raw(None, None);
        assert_eq!(p.pages(0), 0);
    }
}
