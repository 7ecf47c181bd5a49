/// Error types for social-service
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Human-readable messages the caller can show and re-prompt on
    #[error("Validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("You do not have permission to perform that action.")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Repository failures surface as `Unavailable`
impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::Unavailable(format!("{:#}", err))
    }
}

impl ServiceError {
    /// Validation messages, if this is a validation failure
    pub fn messages(&self) -> &[String] {
        match self {
            ServiceError::Validation(messages) => messages,
            _ => &[],
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            ServiceError::Validation(messages) => HttpResponse::build(status).json(
                serde_json::json!({ "errors": messages, "status": status.as_u16() }),
            ),
            // Store internals stay out of client responses
            ServiceError::Unavailable(_) => HttpResponse::build(status).json(serde_json::json!({
                "error": "Please try again later.",
                "status": status.as_u16(),
            })),
            _ => HttpResponse::build(status).json(serde_json::json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            })),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
