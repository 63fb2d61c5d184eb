use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use models::{category, product};

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::product::domain::{NewProduct, Product, ProductImage, ProductPatch, ProductWithCategory};
use crate::product::repository::ProductRepository;

pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn create(&self, input: NewProduct) -> Result<Product, ServiceError> {
        Ok(product::create(&self.db, input).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, ServiceError> {
        product::Entity::find()
            .filter(product::Column::Category.eq(category_id))
            .order_by_asc(product::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn list_with_category(&self, pagination: Pagination) -> Result<Page<ProductWithCategory>, ServiceError> {
        let (page, limit) = pagination.normalize();
        let total = product::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;

        // id breaks ties between rows created in the same instant
        let rows = product::Entity::find()
            .find_also_related(category::Entity)
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .paginate(&self.db, limit)
            .fetch_page(page - 1)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;

        let items = rows.into_iter().map(|(p, c)| ProductWithCategory::join(p, c)).collect();
        Ok(Page::new(items, total, pagination))
    }

    async fn update(&self, id: Uuid, patch: ProductPatch, image: Option<ProductImage>) -> Result<Option<Product>, ServiceError> {
        let Some(existing) = self.get(id).await? else { return Ok(None) };
        let mut am = existing.into_active_model();
        if let Some(name) = patch.name {
            am.name = Set(name);
        }
        if let Some(description) = patch.description {
            am.description = Set(description);
        }
        if let Some(category) = patch.category {
            am.category = Set(category);
        }
        if let Some(price) = patch.price {
            am.price = Set(price);
        }
        if let Some(image) = image {
            am.image = Set(image);
        }
        am.updated_at = Set(chrono::Utc::now().into());
        let updated = am.update(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Product>, ServiceError> {
        let Some(existing) = self.get(id).await? else { return Ok(None) };
        existing
            .clone()
            .delete(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(Some(existing))
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        product::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn image(tag: &str) -> ProductImage {
        ProductImage { url: format!("http://localhost/images/{tag}.png"), local_path: format!("public/images/{tag}.png") }
    }

    #[tokio::test]
    async fn joined_listing_and_partial_update() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let cat = category::create(&db, "Repo Joined").await?;
        let repo = SeaOrmProductRepository::new(db);

        let created = repo
            .create(NewProduct {
                name: "Trail".into(),
                description: Some("grippy".into()),
                price: 80.0,
                category: cat.id,
                image: image("trail"),
            })
            .await?;

        let by_cat = repo.list_by_category(cat.id).await?;
        assert_eq!(by_cat.len(), 1);

        // walk every page until the new product shows up with its category
        let total = repo.count().await?;
        let mut found = None;
        let mut page = 1;
        while found.is_none() && (page - 1) * 100 < total as u32 {
            let listed = repo.list_with_category(Pagination { page, limit: 100 }).await?;
            assert_eq!(listed.total, total);
            found = listed.items.into_iter().find(|p| p.id == created.id);
            page += 1;
        }
        let joined = found.expect("created product listed");
        assert_eq!(joined.category.map(|c| c.name), Some("Repo Joined".to_string()));

        let patch = ProductPatch { description: Some(None), price: Some(0.0), ..Default::default() };
        let updated = repo.update(created.id, patch, Some(image("trail-2"))).await?.expect("row exists");
        assert_eq!(updated.description, None);
        assert_eq!(updated.price, 0.0);
        assert_eq!(updated.name, "Trail");
        assert_eq!(updated.image, image("trail-2"));

        assert!(repo.delete(created.id).await?.is_some());
        assert!(repo.get(created.id).await?.is_none());
        Ok(())
    }
}
