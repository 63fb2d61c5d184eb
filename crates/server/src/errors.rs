use axum::body::{to_bytes, Body};
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use configs::Environment;
use models::errors::ModelError;
use serde::Serialize;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

const INTERNAL_MESSAGE: &str = "Something went wrong";
// plain-text rejection bodies are short; anything longer is not worth echoing
const BARE_BODY_LIMIT: usize = 4 * 1024;

/// Failure envelope: `{statusCode, message, success: false, errors, data: null}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Vec<String>,
    detail: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status_code: u16,
    message: &'a str,
    success: bool,
    errors: &'a [String],
    data: Option<()>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<&'a str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), errors: Vec::new(), detail: None }
    }

    pub fn validation(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }

    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, message) }

    pub fn internal(detail: impl std::fmt::Debug) -> Self {
        Self { detail: Some(format!("{detail:?}")), ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE) }
    }

    pub fn with_detail(mut self, detail: impl std::fmt::Debug) -> Self {
        self.detail = Some(format!("{detail:?}"));
        self
    }

    /// Envelope for an error response that did not come from an `ApiError`.
    fn for_bare_status(status: StatusCode, text: &str) -> Self {
        let message = match status {
            StatusCode::METHOD_NOT_ALLOWED => "Method not allowed".to_string(),
            StatusCode::NOT_FOUND => "Route not found".to_string(),
            s if s.is_server_error() => INTERNAL_MESSAGE.to_string(),
            _ if !text.trim().is_empty() => text.trim().to_string(),
            s => s.canonical_reason().unwrap_or("Request failed").to_string(),
        };
        Self::new(status, message)
    }

    fn render(&self, expose_stack: bool) -> Response {
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            message: &self.message,
            success: false,
            errors: &self.errors,
            data: None,
            stack: if expose_stack { self.detail.as_deref() } else { None },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(ref m) | ServiceError::Model(ModelError::Validation(ref m)) => {
                ApiError::validation(m.clone()).with_detail(&e)
            }
            ServiceError::NotFound(ref m) => ApiError::not_found(m.clone()).with_detail(&e),
            other => ApiError::internal(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        // an oversized body keeps its 413; every other rejection is a 400
        let status = match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE { "Request body too large".to_string() } else { e.body_text() };
        ApiError::new(status, message).with_detail(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self { ApiError::validation(e.body_text()).with_detail(e) }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self { ApiError::validation(e.body_text()).with_detail(e) }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        let status = e.status();
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE { "Upload too large".to_string() } else { e.body_text() };
        ApiError::new(status, message).with_detail(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = self.detail.as_deref().unwrap_or_default(), "request failed");
        }
        // rendered without the stack; `render_errors` adds it back where allowed
        let mut res = self.render(false);
        res.extensions_mut().insert(self);
        res
    }
}

/// How failure envelopes are rendered for one server instance.
#[derive(Clone, Copy, Debug)]
pub struct ErrorRendering {
    pub expose_stack: bool,
}

impl ErrorRendering {
    /// Error details stay out of response bodies in production.
    pub fn for_environment(environment: Environment) -> Self {
        Self { expose_stack: !environment.is_production() }
    }
}

impl Default for ErrorRendering {
    fn default() -> Self { Self { expose_stack: true } }
}

/// Response mapper applied to the whole router.
///
/// `ApiError` responses get their stack attached when the state allows it.
/// Error responses produced outside the handlers (405 from the method router,
/// plain-text rejections, empty 404s from the file service) are rewritten into
/// the same envelope, keeping their status and headers such as `Allow`.
pub async fn render_errors(State(rendering): State<ErrorRendering>, res: Response) -> Response {
    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return res;
    }

    if let Some(err) = res.extensions().get::<ApiError>() {
        if !rendering.expose_stack || err.detail.is_none() {
            return res;
        }
        let rendered = err.render(true);
        return with_original_head(res, rendered);
    }

    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        return res;
    }

    let (parts, body) = res.into_parts();
    let text = match to_bytes(body, BARE_BODY_LIMIT).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    };
    let err = ApiError::for_bare_status(status, &text);
    let rendered = err.render(false);
    with_original_head(Response::from_parts(parts, Body::empty()), rendered)
}

/// `rendered`'s body and content headers on top of `original`'s status,
/// remaining headers and extensions.
fn with_original_head(original: Response, rendered: Response) -> Response {
    let (mut parts, _) = original.into_parts();
    let (rendered_parts, body) = rendered.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    parts.headers.remove(CONTENT_TYPE);
    for name in [CONTENT_TYPE, CONTENT_LENGTH] {
        if let Some(value) = rendered_parts.headers.get(&name) {
            parts.headers.insert(name, value.clone());
        }
    }
    Response::from_parts(parts, body)
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
