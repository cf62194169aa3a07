//! Tipo de error de la aplicación y su traducción a respuestas HTTP.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Error de base de datos: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Error al generar el archivo de exportación: {0}")]
    Export(#[from] csv::Error),
}

impl AppError {
    pub fn not_found(mensaje: impl Into<String>) -> Self {
        Self::NotFound(mensaje.into())
    }

    pub fn validation(mensaje: impl Into<String>) -> Self {
        Self::Validation(mensaje.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("{self}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_encontrado_responde_404() {
        let error = AppError::not_found("Mantenimiento no encontrado");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "Mantenimiento no encontrado");
    }

    #[test]
    fn validacion_responde_400() {
        let error = AppError::validation("Seleccione un vehículo");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "Seleccione un vehículo");
    }

    #[test]
    fn fallo_de_base_de_datos_responde_500_con_el_detalle() {
        let error = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().starts_with("Error de base de datos:"));
    }
}
