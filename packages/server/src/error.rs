//! Mapping of collaborator errors to HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use safety_map_alert::AlertError;
use safety_map_database::{FetchError, SettingsError};
use safety_map_server_models::ApiError;
use thiserror::Error;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Loading or storing reports failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Reading or writing settings failed.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Sending an alert failed.
    #[error(transparent)]
    Alert(#[from] AlertError),

    /// The requested item does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl ServerError {
    fn public_message(&self) -> String {
        match self {
            Self::Fetch(_) => "Failed to load reports".to_string(),
            Self::Settings(_) => "Failed to access settings".to_string(),
            Self::Alert(AlertError::NoContacts) => {
                "Please set up your emergency contacts first.".to_string()
            }
            Self::Alert(_) => "Failed to send alert".to_string(),
            Self::NotFound(message) => message.clone(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Alert(AlertError::NoContacts) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Fetch(_) | Self::Settings(_) | Self::Alert(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("Rejected request: {self}");
        }

        HttpResponse::build(status).json(ApiError {
            error: self.public_message(),
        })
    }
}
