use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, QueryOrder, Set};
use uuid::Uuid;

use models::category;

use crate::category::domain::{Category, CategoryPatch};
use crate::category::repository::CategoryRepository;
use crate::errors::ServiceError;

pub struct SeaOrmCategoryRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category, ServiceError> {
        Ok(category::create(&self.db, name).await?)
    }

    async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        category::Entity::find()
            .order_by_asc(category::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Category>, ServiceError> {
        category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Option<Category>, ServiceError> {
        let Some(existing) = self.get(id).await? else { return Ok(None) };
        let mut am = existing.into_active_model();
        if let Some(name) = patch.name {
            am.name = Set(name);
        }
        am.updated_at = Set(chrono::Utc::now().into());
        let updated = am.update(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Category>, ServiceError> {
        let Some(existing) = self.get(id).await? else { return Ok(None) };
        existing
            .clone()
            .delete(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(Some(existing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn crud_roundtrip_against_postgres() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let repo = SeaOrmCategoryRepository::new(db);

        let created = repo.create("Repo Shoes").await?;
        assert_eq!(repo.get(created.id).await?.map(|c| c.name), Some("Repo Shoes".to_string()));

        let updated = repo
            .update(created.id, CategoryPatch { name: Some("Repo Boots".into()) })
            .await?
            .expect("row exists");
        assert_eq!(updated.name, "Repo Boots");
        assert!(updated.updated_at >= created.updated_at);

        assert!(repo.list().await?.iter().any(|c| c.id == created.id));

        let deleted = repo.delete(created.id).await?.expect("row exists");
        assert_eq!(deleted.id, created.id);
        assert!(repo.get(created.id).await?.is_none());
        assert!(repo.delete(created.id).await?.is_none());
        Ok(())
    }
}
