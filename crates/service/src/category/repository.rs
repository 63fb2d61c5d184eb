use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Category, CategoryPatch};
use crate::errors::ServiceError;

/// Persistence for categories.
///
/// `update` and `delete` return `None` when the id does not resolve.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<Category, ServiceError>;
    async fn list(&self) -> Result<Vec<Category>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<Category>, ServiceError>;
    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Option<Category>, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Category>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockCategoryRepository {
        rows: Mutex<Vec<Category>>, // insertion order
    }

    impl MockCategoryRepository {
        /// Snapshot of the stored rows, shared with the product mock for joins.
        pub fn snapshot(&self) -> Vec<Category> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CategoryRepository for MockCategoryRepository {
        async fn create(&self, name: &str) -> Result<Category, ServiceError> {
            models::category::validate_name(name)?;
            let now = Utc::now().into();
            let row = Category { id: Uuid::new_v4(), name: name.to_string(), created_at: now, updated_at: now };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn list(&self) -> Result<Vec<Category>, ServiceError> {
            Ok(self.snapshot())
        }

        async fn get(&self, id: Uuid) -> Result<Option<Category>, ServiceError> {
            Ok(self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned())
        }

        async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Option<Category>, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|c| c.id == id) else { return Ok(None) };
            if let Some(name) = patch.name {
                row.name = name;
            }
            row.updated_at = Utc::now().into();
            Ok(Some(row.clone()))
        }

        async fn delete(&self, id: Uuid) -> Result<Option<Category>, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let idx = rows.iter().position(|c| c.id == id);
            Ok(idx.map(|i| rows.remove(i)))
        }
    }
}
