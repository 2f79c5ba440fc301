//! Servicios de integración externa

pub mod image_generation_service;
