//! Error handling for the Bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookshelf_kernel::ContextError;
use thiserror::Error;
use uuid::Uuid;

use crate::response::ApiResponse;

/// Message sent to clients for any internal failure; details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "something went wrong";

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("unprocessable entity: {message}")]
    UnprocessableEntity { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("internal error: {message}")]
    Internal {
        message: String,
        cause: Option<anyhow::Error>,
    },
}

impl AppError {
    /// Create an unprocessable entity error (422)
    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        Self::UnprocessableEntity {
            message: message.into(),
        }
    }

    /// Create a not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an internal error (500) with a client-facing message
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            cause: None,
        }
    }

    /// Create an internal error that keeps the underlying cause for logging
    pub fn internal_with_cause(
        message: impl Into<String>,
        cause: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message
    pub fn message(&self) -> &str {
        match self {
            AppError::UnprocessableEntity { message }
            | AppError::NotFound { message }
            | AppError::Internal { message, .. } => message,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_with_cause(INTERNAL_ERROR_MESSAGE, err)
    }
}

impl From<ContextError> for AppError {
    fn from(err: ContextError) -> Self {
        Self::internal_with_cause(err.to_string(), err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status_code();

        match &self {
            AppError::Internal {
                cause: Some(cause),
                ..
            } => tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %format!("{:#}", cause),
                "request failed"
            ),
            _ => tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                message = %self.message(),
                "request rejected"
            ),
        }

        ApiResponse::error(status, self.message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::unprocessable_entity("bad").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::not_found("gone").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::internal("oops").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = AppError::not_found("data not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({
                "status": "Not Found",
                "status_code": 404,
                "message": "data not found",
                "data": null
            })
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let error = AppError::from(anyhow::anyhow!("connection refused by 10.0.0.3"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["status"], "Internal Server Error");
        assert!(body["data"].is_null());
    }

    #[test]
    fn test_context_error_becomes_internal() {
        let error = AppError::from(ContextError::DeadlineExceeded);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message(), "request deadline exceeded");
    }

    #[test]
    fn test_context_error_is_kept_as_cause() {
        let error = AppError::from(ContextError::Cancelled);
        match error {
            AppError::Internal {
                cause: Some(cause),
                message,
            } => {
                assert_eq!(message, "request cancelled");
                assert_eq!(
                    cause.downcast_ref::<ContextError>(),
                    Some(&ContextError::Cancelled)
                );
            }
            other => panic!("expected internal error with cause, got {other:?}"),
        }
    }
}
