use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{Product, ProductDraft, ProductImage, ProductPatch, ProductWithCategory};
use super::repository::ProductRepository;
use crate::category::repository::CategoryRepository;
use crate::cleanup::CleanupQueue;
use crate::errors::ServiceError;
use crate::media::{MediaStore, StagedFile};
use crate::pagination::{Page, PageLabels, Pagination};

const ENTITY: &str = "Product";
pub const PRODUCT_LABELS: PageLabels = PageLabels::new("products", "totalProducts");

/// Product CRUD plus the image upload and reclamation workflow.
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    media: Arc<dyn MediaStore>,
    cleanup: CleanupQueue,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        media: Arc<dyn MediaStore>,
        cleanup: CleanupQueue,
    ) -> Self {
        Self { products, categories, media, cleanup }
    }

    /// One page of products with their category joined in.
    #[instrument(skip(self))]
    pub async fn list(&self, pagination: Pagination) -> Result<Page<ProductWithCategory>, ServiceError> {
        Ok(self.products.list_with_category(pagination).await?.with_labels(PRODUCT_LABELS))
    }

    /// Create a product from `draft` and the staged `image`.
    ///
    /// The category is checked before anything touches the media store and
    /// nothing is inserted until the upload succeeded. The staged file is
    /// discarded on every path.
    ///
    /// # Examples
    /// ```
    /// use service::category::repository::{mock::MockCategoryRepository, CategoryRepository};
    /// use service::product::{ProductService, domain::ProductDraft, repository::mock::MockProductRepository};
    /// use service::{cleanup::CleanupQueue, errors::ServiceError, media::mock::RecordingMediaStore};
    /// use std::sync::Arc;
    /// tokio_test::block_on(async {
    ///     let categories = Arc::new(MockCategoryRepository::default());
    ///     let shoes = categories.create("Shoes").await.unwrap();
    ///     let media = Arc::new(RecordingMediaStore::default());
    ///     let (cleanup, _worker) = CleanupQueue::spawn(media.clone());
    ///     let svc = ProductService::new(
    ///         Arc::new(MockProductRepository::new(categories.clone())), categories, media, cleanup,
    ///     );
    ///     let draft = ProductDraft { name: "Runner".into(), description: None, category: shoes.id, price: 10.0 };
    ///     let err = svc.create(draft, None).await.unwrap_err();
    ///     assert!(matches!(err, ServiceError::Validation(_)));
    /// });
    /// ```
    #[instrument(skip(self, draft, image), fields(category_id = %draft.category))]
    pub async fn create(&self, draft: ProductDraft, image: Option<StagedFile>) -> Result<Product, ServiceError> {
        let result = self.create_inner(draft, image.as_ref()).await;
        if let Some(staged) = image {
            staged.discard().await;
        }
        result
    }

    async fn create_inner(&self, draft: ProductDraft, image: Option<&StagedFile>) -> Result<Product, ServiceError> {
        draft.validate()?;
        if self.categories.get(draft.category).await?.is_none() {
            return Err(ServiceError::NotFound("Category does not exist".into()));
        }
        let staged = image.ok_or_else(|| ServiceError::validation("Provide product image"))?;
        let stored = self.store(staged).await?;

        // reclaimed on error or if this future is dropped mid-insert
        let guard = self.cleanup.guard(stored.local_path.clone());
        let created = self.products.create(draft.into_new_product(stored)).await.map_err(|e| {
            warn!(error = %e, "insert failed after upload");
            e
        })?;
        guard.commit();
        info!(product_id = %created.id, event = "product_created", "product created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Product, ServiceError> {
        self.products.get(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY))
    }

    /// Every product referencing `category_id`; the category itself must exist.
    #[instrument(skip(self))]
    pub async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, ServiceError> {
        if self.categories.get(category_id).await?.is_none() {
            return Err(ServiceError::not_found(crate::category::service::ENTITY));
        }
        self.products.list_by_category(category_id).await
    }

    /// Apply `patch`, swapping in `image` when one is supplied.
    ///
    /// The previous image file is queued for deletion only after the write
    /// succeeded and only if its url actually changed.
    #[instrument(skip(self, patch, image))]
    pub async fn update(&self, id: Uuid, patch: ProductPatch, image: Option<StagedFile>) -> Result<Product, ServiceError> {
        let result = self.update_inner(id, patch, image.as_ref()).await;
        if let Some(staged) = image {
            staged.discard().await;
        }
        result
    }

    async fn update_inner(&self, id: Uuid, patch: ProductPatch, image: Option<&StagedFile>) -> Result<Product, ServiceError> {
        let existing = self.products.get(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY))?;
        patch.validate()?;

        let new_image = match image {
            Some(staged) => Some(self.store(staged).await?),
            None => None,
        };
        let guard = new_image.as_ref().map(|i| self.cleanup.guard(i.local_path.clone()));

        let updated = match self.products.update(id, patch, new_image).await {
            Ok(Some(updated)) => updated,
            // deleted between load and write
            Ok(None) => return Err(ServiceError::not_found(ENTITY)),
            Err(e) => {
                warn!(error = %e, "update failed after upload");
                return Err(e);
            }
        };
        if let Some(guard) = guard {
            guard.commit();
        }

        if updated.image.url != existing.image.url {
            self.cleanup.reclaim(existing.image.local_path);
        }
        info!(product_id = %id, event = "product_updated", "product updated");
        Ok(updated)
    }

    /// Delete a product and queue its image file for reclamation.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<Product, ServiceError> {
        let deleted = self.products.delete(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY))?;
        self.cleanup.reclaim(deleted.image.local_path.clone());
        info!(product_id = %id, event = "product_deleted", "product deleted");
        Ok(deleted)
    }

    async fn store(&self, staged: &StagedFile) -> Result<ProductImage, ServiceError> {
        self.media
            .upload(&staged.path)
            .await?
            .ok_or_else(|| ServiceError::validation("Provide a product image"))
    }
}
