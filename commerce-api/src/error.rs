use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient stock for product {product}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product: String,
        available: u32,
        requested: u32,
    },

    #[error("{0}")]
    OperationNotAllowed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Auth(_) => (StatusCode::UNAUTHORIZED, "Authentication error"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            ApiError::InsufficientStock { .. } => (StatusCode::BAD_REQUEST, "Insufficient stock"),
            ApiError::OperationNotAllowed(_) => (StatusCode::BAD_REQUEST, "Operation not allowed"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            ApiError::Migrate(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            ApiError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}
