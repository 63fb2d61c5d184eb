use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{NewProduct, Product, ProductImage, ProductPatch, ProductWithCategory};
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Persistence for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: NewProduct) -> Result<Product, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<Product>, ServiceError>;
    async fn list_by_category(&self, category: Uuid) -> Result<Vec<Product>, ServiceError>;
    /// Products joined with their category, ordered by creation time.
    async fn list_with_category(&self, pagination: Pagination) -> Result<Page<ProductWithCategory>, ServiceError>;
    /// `None` when the id does not resolve.
    async fn update(&self, id: Uuid, patch: ProductPatch, image: Option<ProductImage>) -> Result<Option<Product>, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Product>, ServiceError>;
    async fn count(&self) -> Result<u64, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use crate::category::repository::mock::MockCategoryRepository;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    pub struct MockProductRepository {
        rows: Mutex<Vec<Product>>, // insertion order == creation order
        categories: Arc<MockCategoryRepository>,
    }

    impl MockProductRepository {
        /// `categories` backs the join in `list_with_category`.
        pub fn new(categories: Arc<MockCategoryRepository>) -> Self {
            Self { rows: Mutex::new(Vec::new()), categories }
        }
    }

    #[async_trait]
    impl ProductRepository for MockProductRepository {
        async fn create(&self, input: NewProduct) -> Result<Product, ServiceError> {
            input.validate()?;
            let now = Utc::now().into();
            let row = Product {
                id: Uuid::new_v4(),
                name: input.name,
                description: input.description,
                price: input.price,
                category: input.category,
                image: input.image,
                created_at: now,
                updated_at: now,
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn get(&self, id: Uuid) -> Result<Option<Product>, ServiceError> {
            Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn list_by_category(&self, category: Uuid) -> Result<Vec<Product>, ServiceError> {
            Ok(self.rows.lock().unwrap().iter().filter(|p| p.category == category).cloned().collect())
        }

        async fn list_with_category(&self, pagination: Pagination) -> Result<Page<ProductWithCategory>, ServiceError> {
            let categories = self.categories.snapshot();
            let rows = self.rows.lock().unwrap().clone();
            let total = rows.len() as u64;
            let (_, limit) = pagination.normalize();
            let items = rows
                .into_iter()
                .skip(pagination.offset() as usize)
                .take(limit as usize)
                .map(|p| {
                    let cat = categories.iter().find(|c| c.id == p.category).cloned();
                    ProductWithCategory::join(p, cat)
                })
                .collect();
            Ok(Page::new(items, total, pagination))
        }

        async fn update(&self, id: Uuid, patch: ProductPatch, image: Option<ProductImage>) -> Result<Option<Product>, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|p| p.id == id) else { return Ok(None) };
            patch.apply(row, image);
            row.updated_at = Utc::now().into();
            Ok(Some(row.clone()))
        }

        async fn delete(&self, id: Uuid) -> Result<Option<Product>, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let idx = rows.iter().position(|p| p.id == id);
            Ok(idx.map(|i| rows.remove(i)))
        }

        async fn count(&self) -> Result<u64, ServiceError> {
            Ok(self.rows.lock().unwrap().len() as u64)
        }
    }
}
