use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Graph store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("{store} store timed out after {timeout_ms}ms")]
    StoreTimeout {
        store: &'static str,
        timeout_ms: u64,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when retrying the same request later may succeed.
    /// Store failures abort the whole recommendation request (fail closed).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::Store(_) | AppError::StoreTimeout { .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(_) | AppError::Store(_) | AppError::StoreTimeout { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_timeout_is_retryable() {
        let err = AppError::StoreTimeout {
            store: "adjacency",
            timeout_ms: 500,
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_input_is_not_retryable() {
        let err = AppError::InvalidInput("limit must be positive".to_string());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_timeout_message() {
        let err = AppError::StoreTimeout {
            store: "scores",
            timeout_ms: 250,
        };
        assert_eq!(err.to_string(), "scores store timed out after 250ms");
    }
}
