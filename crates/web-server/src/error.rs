use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),
    #[error("Invalid request: {0}")]
    Validation(#[from] core_types::CoreError),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(database::DbError::NotFound) => (
                StatusCode::NOT_FOUND,
                "The requested record was not found".to_string(),
            ),
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Config(config_err) => {
                tracing::error!(error = ?config_err, "Configuration error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A server configuration error occurred".to_string(),
                )
            }
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
