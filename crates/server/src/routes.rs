pub mod category;
pub mod product;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::map_response_with_state,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::errors::{render_errors, ApiError};
use crate::extract::JSON_BODY_LIMIT;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

// multipart framing and the text fields ride on top of the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Route not found")
}

/// Catalog routes, relative to the API prefix.
pub fn api_router(max_upload_bytes: usize) -> Router<ServerState> {
    let categories = Router::new()
        .route("/category", get(category::list).post(category::create))
        .route(
            "/category/:id",
            get(category::get).patch(category::update).delete(category::delete),
        )
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT));

    let products = Router::new()
        .route("/product", get(product::list).post(product::create))
        .route("/product/category/:id", get(product::list_by_category))
        .route(
            "/product/:id",
            get(product::get).patch(product::update).delete(product::delete),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD)));

    categories.merge(products)
}

/// Build the full application router: health, catalog API, static images and docs.
pub fn build_router(state: ServerState, cors: CorsLayer, api_prefix: &str, images_dir: &str) -> Router {
    let api = api_router(state.uploads.max_bytes);
    let errors = state.errors;
    let api = if api_prefix.is_empty() { api } else { Router::new().nest(api_prefix, api) };

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .nest_service("/images", ServeDir::new(images_dir))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .with_state(state)
        .layer(map_response_with_state(errors, render_errors))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
