use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use service::category::domain::{Category, CategoryPatch};

use crate::errors::ApiError;
use crate::extract::{double_option, parse_id, reject_null};
use crate::response::ApiResponse;
use crate::state::ServerState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryInput {
    pub name: String,
}

/// PATCH body. An omitted `name` keeps the current one; `null` is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCategoryInput {
    #[serde(default, deserialize_with = "double_option")]
    name: Option<Option<String>>,
}

impl TryFrom<UpdateCategoryInput> for CategoryPatch {
    type Error = ApiError;

    fn try_from(input: UpdateCategoryInput) -> Result<Self, Self::Error> {
        Ok(CategoryPatch { name: reject_null("name", input.name)? })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCategory {
    pub deleted_category: Category,
}

#[utoipa::path(get, path = "/api/v1/category", tag = "category",
    responses((status = 200, description = "All categories", body = crate::openapi::CategoryListEnvelope)))]
pub async fn list(State(state): State<ServerState>) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(ApiResponse::ok(categories, "Category fetched successfully!"))
}

#[utoipa::path(post, path = "/api/v1/category", tag = "category", request_body = CreateCategoryInput,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CategoryEnvelope),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<CreateCategoryInput>, JsonRejection>,
) -> Result<ApiResponse<Category>, ApiError> {
    let Json(input) = body?;
    let category = state.categories.create(&input.name).await?;
    Ok(ApiResponse::created(category, "Category created successfully!"))
}

#[utoipa::path(get, path = "/api/v1/category/{id}", tag = "category",
    params(("id" = String, Path, description = "Category id (UUID)")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::CategoryEnvelope),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<ApiResponse<Category>, ApiError> {
    let category = state.categories.get(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(category, "Category fetched successfully!"))
}

#[utoipa::path(patch, path = "/api/v1/category/{id}", tag = "category",
    params(("id" = String, Path, description = "Category id (UUID)")),
    request_body = crate::openapi::CategoryPatchDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::CategoryEnvelope),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorEnvelope),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCategoryInput>, JsonRejection>,
) -> Result<ApiResponse<Category>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = body?;
    let category = state.categories.update(id, input.try_into()?).await?;
    Ok(ApiResponse::ok(category, "Category updated successfully"))
}

#[utoipa::path(delete, path = "/api/v1/category/{id}", tag = "category",
    params(("id" = String, Path, description = "Category id (UUID)")),
    responses(
        (status = 200, description = "Deleted; products keep their category id"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorEnvelope)
    ))]
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeletedCategory>, ApiError> {
    let deleted_category = state.categories.delete(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(DeletedCategory { deleted_category }, "Category deleted successfully"))
}
