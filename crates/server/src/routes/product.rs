use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use serde::Serialize;
use tracing::info;

use service::pagination::Page;
use service::product::domain::{Product, ProductWithCategory};

use crate::errors::ApiError;
use crate::extract::{parse_id, ListQuery, ProductForm};
use crate::response::ApiResponse;
use crate::state::ServerState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProduct {
    pub deleted_product: Product,
}

#[derive(Serialize)]
pub struct ProductsInCategory {
    pub products: Vec<Product>,
}

#[utoipa::path(get, path = "/api/v1/product", tag = "product", params(ListQuery),
    responses(
        (status = 200, description = "One page of products with their category", body = crate::openapi::ProductPageEnvelope),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ApiResponse<Page<ProductWithCategory>>, ApiError> {
    let Query(q) = query?;
    let page = state.products.list(q.into()).await?;
    Ok(ApiResponse::ok(page, "Products fetched successfully!"))
}

#[utoipa::path(post, path = "/api/v1/product", tag = "product",
    request_body(content = crate::openapi::ProductFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = crate::openapi::ProductEnvelope),
        (status = 400, description = "Missing image or invalid fields", body = crate::openapi::ErrorEnvelope),
        (status = 404, description = "Category does not exist", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn create(State(state): State<ServerState>, form: ProductForm) -> Result<ApiResponse<Product>, ApiError> {
    let (draft, image) = form.into_draft()?;
    let product = state.products.create(draft, image).await?;
    Ok(ApiResponse::created(product, "Product created successfully"))
}

#[utoipa::path(get, path = "/api/v1/product/category/{id}", tag = "product",
    params(("id" = String, Path, description = "Category id (UUID)")),
    responses(
        (status = 200, description = "Products in the category"),
        (status = 404, description = "Category not found", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ProductsInCategory>, ApiError> {
    let products = state.products.list_by_category(parse_id(&id)?).await?;
    info!(count = products.len(), "list products by category");
    Ok(ApiResponse::ok(ProductsInCategory { products }, "Product's fetched successfully!"))
}

#[utoipa::path(get, path = "/api/v1/product/{id}", tag = "product",
    params(("id" = String, Path, description = "Product id (UUID)")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::ProductEnvelope),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<ApiResponse<Product>, ApiError> {
    let product = state.products.get(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(product, "Product fetched successfully"))
}

#[utoipa::path(patch, path = "/api/v1/product/{id}", tag = "product",
    params(("id" = String, Path, description = "Product id (UUID)")),
    request_body(content = crate::openapi::ProductFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ProductEnvelope),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorEnvelope),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    form: ProductForm,
) -> Result<ApiResponse<Product>, ApiError> {
    // the form owns any staged image, so early returns remove it
    let id = parse_id(&id)?;
    let (patch, image) = form.into_patch()?;
    let product = state.products.update(id, patch, image).await?;
    Ok(ApiResponse::ok(product, "Product updated successfully"))
}

#[utoipa::path(delete, path = "/api/v1/product/{id}", tag = "product",
    params(("id" = String, Path, description = "Product id (UUID)")),
    responses(
        (status = 200, description = "Deleted; image file removed in the background"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeletedProduct>, ApiError> {
    let deleted_product = state.products.delete(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(DeletedProduct { deleted_product }, "Product deleted successfully!"))
}
