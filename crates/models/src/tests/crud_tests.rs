use crate::{category, product};
use crate::product::{NewProduct, ProductImage};
use sea_orm::{EntityTrait, QueryFilter, ColumnTrait, ModelTrait};
use anyhow::Result;
use uuid::Uuid;

/// Test category CRUD operations
#[tokio::test]
async fn test_category_crud() -> Result<()> {
    let Some(db) = super::setup_test_db().await else { return Ok(()) };

    let name = format!("test_category_{}", Uuid::new_v4());
    let created = category::create(&db, &name).await?;
    assert_eq!(created.name, name);
    assert_eq!(created.created_at, created.updated_at);

    let found = category::Entity::find_by_id(created.id).one(&db).await?;
    assert_eq!(found.map(|c| c.name), Some(name));

    assert!(category::create(&db, "   ").await.is_err());

    category::Entity::delete_by_id(created.id).exec(&db).await?;
    assert!(category::Entity::find_by_id(created.id).one(&db).await?.is_none());
    Ok(())
}

/// Test product CRUD operations and the category join
#[tokio::test]
async fn test_product_crud_and_related_category() -> Result<()> {
    let Some(db) = super::setup_test_db().await else { return Ok(()) };

    let cat = category::create(&db, &format!("test_category_{}", Uuid::new_v4())).await?;
    let image = ProductImage {
        url: "http://localhost:8080/images/test.png".into(),
        local_path: "public/images/test.png".into(),
    };
    let created = product::create(&db, NewProduct {
        name: "Trail Runner".into(),
        description: Some("light".into()),
        price: 89.9,
        category: cat.id,
        image: image.clone(),
    }).await?;
    assert_eq!(created.image, image);

    let by_category = product::Entity::find()
        .filter(product::Column::Category.eq(cat.id))
        .all(&db)
        .await?;
    assert_eq!(by_category.len(), 1);

    let joined = created.find_related(category::Entity).one(&db).await?;
    assert_eq!(joined.map(|c| c.id), Some(cat.id));

    // No foreign key: removing the category leaves the product behind
    category::Entity::delete_by_id(cat.id).exec(&db).await?;
    assert!(product::Entity::find_by_id(created.id).one(&db).await?.is_some());

    product::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}
