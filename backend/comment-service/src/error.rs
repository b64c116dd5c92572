/// Error types for comment-service
///
/// Every failure a service operation can produce maps onto one of four kinds:
/// bad input fields, a missing referenced entity, bad pagination parameters,
/// or a storage failure. Errors are converted to HTTP responses for
/// API clients; storage detail never leaves the process.
use crate::db::GatewayError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for comment-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Body returned for failures whose detail stays in the logs.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again later.";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed input fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad pagination parameters
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Persistence gateway failure
    #[error("Storage error: {0}")]
    Storage(#[from] GatewayError),
}

impl AppError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        AppError::NotFound(format!("{} not found with ID: {}", entity, id))
    }

    /// Message safe to hand to API clients.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Storage(_) => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.public_message(),
            "status": status.as_u16(),
        }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, err.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join(", "))
    }
}
