//! Request extraction for catalog handlers.
//!
//! Product writes arrive either as `multipart/form-data` (text fields plus an
//! optional `image` file) or as a JSON body with the same fields. Both end up
//! in [`ProductForm`]. A staged file is owned by the form, so it is removed
//! again whenever extraction fails or the request is abandoned.

use std::path::{Path, PathBuf};

use axum::async_trait;
use axum::body::to_bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde::{Deserialize, Deserializer};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use utoipa::IntoParams;
use uuid::Uuid;

use service::media::StagedFile;
use service::pagination::Pagination;
use service::product::domain::{ProductDraft, ProductPatch};

use crate::errors::ApiError;
use crate::state::{ServerState, UploadSettings};

pub const JSON_BODY_LIMIT: usize = 16 * 1024;
const IMAGE_FIELD: &str = "image";

/// Parse a path id; anything but a UUID is a client error.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::validation(format!("Invalid id: {raw}")))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page, default 1
    pub page: Option<u32>,
    /// page size, default 25, clamped to 1..=100
    pub limit: Option<u32>,
}

impl From<ListQuery> for Pagination {
    fn from(q: ListQuery) -> Self { Pagination::new(q.page, q.limit) }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_price(self) -> Result<f64, ApiError> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s.trim().parse::<f64>().map_err(|_| ApiError::validation("price must be a number")),
        }
    }
}

/// Keeps an explicit `null` apart from an absent key: absent is `None`,
/// `null` is `Some(None)`.
pub(crate) fn double_option<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// Flatten a field that may be omitted but never set to `null`.
pub(crate) fn reject_null<T>(field: &str, value: Option<Option<T>>) -> Result<Option<T>, ApiError> {
    match value {
        Some(None) => Err(ApiError::validation(format!("{field} may not be null"))),
        value => Ok(value.flatten()),
    }
}

/// Raw product fields before type conversion.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProductFields {
    #[serde(default, deserialize_with = "double_option")]
    name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    price: Option<Option<NumberOrString>>,
}

impl ProductFields {
    fn set_text(&mut self, key: &str, value: String) -> Result<(), ApiError> {
        match key {
            "name" => self.name = Some(Some(value)),
            "description" => self.description = Some(Some(value).filter(|v| !v.is_empty())),
            "category" => self.category = Some(Some(value)),
            "price" => self.price = Some(Some(NumberOrString::Text(value))),
            other => return Err(ApiError::validation(format!("Unexpected field: {other}"))),
        }
        Ok(())
    }

    fn category_id(raw: &str) -> Result<Uuid, ApiError> {
        Uuid::parse_str(raw.trim()).map_err(|_| ApiError::validation("category must be a valid id"))
    }

    fn price(value: Option<Option<NumberOrString>>) -> Result<Option<f64>, ApiError> {
        reject_null("price", value)?.map(NumberOrString::into_price).transpose()
    }
}

/// Product fields plus the optional staged image.
#[derive(Debug, Default)]
pub struct ProductForm {
    fields: ProductFields,
    pub image: Option<StagedFile>,
}

impl ProductForm {
    /// Fields for a create. `name` and `category` are required; `price` defaults to 0.
    ///
    /// On error the staged image is dropped along with the form.
    pub fn into_draft(self) -> Result<(ProductDraft, Option<StagedFile>), ApiError> {
        let ProductForm { fields, image } = self;
        let category = reject_null("category", fields.category)?
            .ok_or_else(|| ApiError::validation("category is required"))?;
        let draft = ProductDraft {
            name: reject_null("name", fields.name)?.unwrap_or_default(),
            description: fields.description.flatten(),
            category: ProductFields::category_id(&category)?,
            price: ProductFields::price(fields.price)?.unwrap_or(0.0),
        };
        Ok((draft, image))
    }

    /// Only `description` may be cleared with an explicit `null`.
    pub fn into_patch(self) -> Result<(ProductPatch, Option<StagedFile>), ApiError> {
        let ProductForm { fields, image } = self;
        let patch = ProductPatch {
            name: reject_null("name", fields.name)?,
            description: fields.description,
            category: reject_null("category", fields.category)?
                .as_deref()
                .map(ProductFields::category_id)
                .transpose()?,
            price: ProductFields::price(fields.price)?,
        };
        Ok((patch, image))
    }

    async fn from_multipart(mut multipart: Multipart, uploads: &UploadSettings) -> Result<Self, ApiError> {
        let mut form = ProductForm::default();
        form.read_parts(&mut multipart, uploads).await?;
        Ok(form)
    }

    async fn read_parts(&mut self, multipart: &mut Multipart, uploads: &UploadSettings) -> Result<(), ApiError> {
        while let Some(mut field) = multipart.next_field().await? {
            let key = field.name().unwrap_or_default().to_string();
            if key != IMAGE_FIELD {
                let value = field.text().await?;
                self.fields.set_text(&key, value)?;
                continue;
            }

            let original_name = field.file_name().unwrap_or_default().to_string();
            if original_name.is_empty() {
                // empty file input
                continue;
            }
            if self.image.is_some() {
                return Err(ApiError::validation("Only one image may be uploaded"));
            }
            let content_type = field.content_type().map(str::to_string);
            if !content_type.as_deref().is_some_and(|ct| ct.starts_with("image/")) {
                return Err(ApiError::validation("Only image uploads are allowed"));
            }

            let path = staging_path(&uploads.temp_dir, &original_name);
            let mut file = tokio::fs::File::create(&path).await.map_err(ApiError::internal)?;
            // owned by the form before the first write so a failed copy is removed
            self.image = Some(StagedFile::new(path.clone(), original_name, content_type));

            let mut size: u64 = 0;
            while let Some(chunk) = field.chunk().await? {
                size += chunk.len() as u64;
                if size > uploads.max_bytes as u64 {
                    return Err(ApiError::new(axum::http::StatusCode::PAYLOAD_TOO_LARGE, "Upload too large"));
                }
                file.write_all(&chunk).await.map_err(ApiError::internal)?;
            }
            file.flush().await.map_err(ApiError::internal)?;
            if let Some(staged) = self.image.as_mut() {
                staged.size = size;
            }
            debug!(path = %path.display(), size, "staged upload");
        }
        Ok(())
    }

    async fn from_json(req: Request) -> Result<Self, ApiError> {
        // the product routes allow upload-sized bodies, so JSON gets its own cap
        let bytes = to_bytes(req.into_body(), JSON_BODY_LIMIT).await.map_err(|e| {
            ApiError::new(axum::http::StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").with_detail(e)
        })?;
        if bytes.is_empty() {
            return Ok(ProductForm::default());
        }
        let fields: ProductFields =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::validation(format!("Invalid JSON body: {e}")))?;
        Ok(ProductForm { fields, image: None })
    }
}

/// `{temp_dir}/{uuid}-{sanitized original name}`
fn staging_path(temp_dir: &Path, original_name: &str) -> PathBuf {
    let base = Path::new(original_name).file_name().and_then(|n| n.to_str()).unwrap_or("upload");
    let sanitized: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    temp_dir.join(format!("{}-{}", Uuid::new_v4(), sanitized))
}

#[async_trait]
impl FromRequest<ServerState> for ProductForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &ServerState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            Self::from_multipart(multipart, &state.uploads).await
        } else if content_type.is_empty() || content_type.starts_with("application/json") {
            Self::from_json(req).await
        } else {
            Err(ApiError::new(
                axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected multipart/form-data or application/json",
            ))
        }
    }
}
