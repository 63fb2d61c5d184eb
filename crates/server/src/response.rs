use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Success envelope: `{statusCode, data, message, success: true}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self { status_code: status.as_u16(), data, message: message.into(), success: status.is_success(), status }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self { Self::new(StatusCode::OK, data, message) }

    pub fn created(data: T, message: impl Into<String>) -> Self { Self::new(StatusCode::CREATED, data, message) }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
