use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{Category, CategoryPatch};
use super::repository::CategoryRepository;
use crate::errors::ServiceError;

pub(crate) const ENTITY: &str = "Category";

/// CRUD over categories, independent of the web framework.
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self { Self { repo } }

    /// Create a category. Names are not unique.
    ///
    /// # Examples
    /// ```
    /// use service::category::{CategoryService, repository::mock::MockCategoryRepository};
    /// use std::sync::Arc;
    /// let svc = CategoryService::new(Arc::new(MockCategoryRepository::default()));
    /// let created = tokio_test::block_on(svc.create("Shoes")).unwrap();
    /// let fetched = tokio_test::block_on(svc.get(created.id)).unwrap();
    /// assert_eq!(fetched.name, "Shoes");
    /// ```
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<Category, ServiceError> {
        models::category::validate_name(name)?;
        let created = self.repo.create(name).await?;
        info!(category_id = %created.id, event = "category_created", "category created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Category, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY))
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, ServiceError> {
        if let Some(name) = &patch.name {
            models::category::validate_name(name)?;
        }
        let updated = self.repo.update(id, patch).await?.ok_or_else(|| ServiceError::not_found(ENTITY))?;
        info!(category_id = %id, event = "category_updated", "category updated");
        Ok(updated)
    }

    /// Delete a category and return its last state. Products keep pointing at it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<Category, ServiceError> {
        let deleted = self
            .repo
            .delete(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category does not exist".into()))?;
        info!(category_id = %id, event = "category_deleted", "category deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::repository::mock::MockCategoryRepository;

    fn svc() -> CategoryService { CategoryService::new(Arc::new(MockCategoryRepository::default())) }

    #[tokio::test]
    async fn create_then_get_returns_same_name() {
        let svc = svc();
        let created = svc.create("Shoes").await.unwrap();
        assert_eq!(svc.get(created.id).await.unwrap().name, "Shoes");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let svc = svc();
        assert!(matches!(svc.create("   ").await, Err(ServiceError::Model(_))));
        let created = svc.create("Hats").await.unwrap();
        let res = svc.update(created.id, CategoryPatch { name: Some(String::new()) }).await;
        assert!(matches!(res, Err(ServiceError::Model(_))));
        assert_eq!(svc.get(created.id).await.unwrap().name, "Hats");
    }

    #[tokio::test]
    async fn duplicate_names_are_allowed() {
        let svc = svc();
        svc.create("Shoes").await.unwrap();
        svc.create("Shoes").await.unwrap();
        assert_eq!(svc.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let svc = svc();
        let id = Uuid::new_v4();
        assert!(matches!(svc.get(id).await, Err(ServiceError::NotFound(m)) if m == "Category not found"));
        assert!(matches!(svc.update(id, CategoryPatch::default()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_with_empty_patch_keeps_name() {
        let svc = svc();
        let created = svc.create("Bags").await.unwrap();
        let updated = svc.update(created.id, CategoryPatch::default()).await.unwrap();
        assert_eq!(updated.name, "Bags");
        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn delete_returns_prior_state() {
        let svc = svc();
        let created = svc.create("Socks").await.unwrap();
        let deleted = svc.delete(created.id).await.unwrap();
        assert_eq!(deleted, created);
        assert!(svc.list().await.unwrap().is_empty());
    }
}
