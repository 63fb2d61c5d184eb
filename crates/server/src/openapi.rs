use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CategoryDoc {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct CategoryPatchDoc { pub name: Option<String> }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductImageDoc { pub url: String, pub local_path: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductDoc {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Category id
    pub category: String,
    pub image: ProductImageDoc,
    pub created_at: String,
    pub updated_at: String,
}

/// Multipart body for product writes. On update every field is optional and
/// a JSON body with the same text fields is accepted as well.
#[derive(ToSchema)]
pub struct ProductFormDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductPageDoc {
    pub products: Vec<ProductDoc>,
    pub total_products: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    pub paging_counter: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CategoryEnvelope { pub status_code: u16, pub data: CategoryDoc, pub message: String, pub success: bool }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CategoryListEnvelope { pub status_code: u16, pub data: Vec<CategoryDoc>, pub message: String, pub success: bool }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductEnvelope { pub status_code: u16, pub data: ProductDoc, pub message: String, pub success: bool }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductPageEnvelope { pub status_code: u16, pub data: ProductPageDoc, pub message: String, pub success: bool }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub message: String,
    pub success: bool,
    pub errors: Vec<String>,
    /// Debug detail; omitted in production
    pub stack: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::category::list,
        crate::routes::category::create,
        crate::routes::category::get,
        crate::routes::category::update,
        crate::routes::category::delete,
        crate::routes::product::list,
        crate::routes::product::create,
        crate::routes::product::list_by_category,
        crate::routes::product::get,
        crate::routes::product::update,
        crate::routes::product::delete,
    ),
    components(
        schemas(
            HealthResponse,
            crate::routes::category::CreateCategoryInput,
            CategoryDoc,
            CategoryPatchDoc,
            ProductImageDoc,
            ProductDoc,
            ProductFormDoc,
            ProductPageDoc,
            CategoryEnvelope,
            CategoryListEnvelope,
            ProductEnvelope,
            ProductPageEnvelope,
            ErrorEnvelope,
        )
    ),
    tags(
        (name = "health"),
        (name = "category"),
        (name = "product")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_catalog_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/api/v1/category", "/api/v1/product/{id}", "/api/v1/product/category/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
