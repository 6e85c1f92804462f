//! Uniform response envelope written by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "success";

/// `{status, status_code, message, data}` wrapper.
///
/// Successful responses carry `data`; error responses carry `null` data and
/// the cause in `message`. `status_code` always equals the HTTP status line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub status: String,
    pub status_code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(status: StatusCode, data: T) -> Self {
        Self {
            status: status_phrase(status),
            status_code: status.as_u16(),
            message: SUCCESS_MESSAGE.to_string(),
            data: Some(data),
        }
    }

    /// `200 OK` envelope
    pub fn ok(data: T) -> Self {
        Self::success(StatusCode::OK, data)
    }

    /// `201 Created` envelope
    pub fn created(data: T) -> Self {
        Self::success(StatusCode::CREATED, data)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl ApiResponse<()> {
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status_phrase(status),
            status_code: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

fn status_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
