use sea_orm::{entity::prelude::*, FromJsonQueryResult, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{category, errors};

/// Hosted image owned by a single product.
///
/// `url` is what clients fetch; `local_path` is the media store's handle used
/// to delete the file once the product stops referencing it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    pub local_path: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub price: f64,
    /// Category id; not a foreign key.
    pub category: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub image: ProductImage,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Category }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::Category)
                .to(category::Column::Id)
                .into(),
        }
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields needed to insert a product; the image must already be stored.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Uuid,
    pub image: ProductImage,
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("product name is required".into()));
    }
    if name.chars().count() > 256 {
        return Err(errors::ModelError::Validation("product name must be at most 256 characters".into()));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), errors::ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(errors::ModelError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), errors::ModelError> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }
}

pub async fn create(db: &DatabaseConnection, input: NewProduct) -> Result<Model, errors::ModelError> {
    input.validate()?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        description: Set(input.description),
        price: Set(input.price),
        category: Set(input.category),
        image: Set(input.image),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewProduct {
        NewProduct {
            name: "Runner".into(),
            description: None,
            price: 49.5,
            category: Uuid::new_v4(),
            image: ProductImage { url: "http://localhost/images/a.png".into(), local_path: "public/images/a.png".into() },
        }
    }

    #[test]
    fn validates_name_and_price() {
        assert!(sample().validate().is_ok());
        assert!(NewProduct { name: "  ".into(), ..sample() }.validate().is_err());
        assert!(NewProduct { price: -1.0, ..sample() }.validate().is_err());
        assert!(NewProduct { price: f64::NAN, ..sample() }.validate().is_err());
        assert!(NewProduct { price: 0.0, ..sample() }.validate().is_ok());
    }

    #[test]
    fn image_serializes_camel_case() {
        let json = serde_json::to_value(&sample().image).unwrap();
        assert_eq!(json["localPath"], "public/images/a.png");
        assert!(json.get("local_path").is_none());
    }
}
