use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
pub use models::category::Model as Category;
pub use models::product::{Model as Product, NewProduct, ProductImage};

/// Product fields as submitted by a client, before an image is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub category: Uuid,
    pub price: f64,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), ServiceError> {
        models::product::validate_name(&self.name)?;
        models::product::validate_price(self.price)?;
        Ok(())
    }

    pub fn into_new_product(self, image: ProductImage) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            image,
        }
    }
}

/// Partial product update.
///
/// `description: Some(None)` clears the field, `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Uuid>,
    pub price: Option<f64>,
}

impl ProductPatch {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if let Some(name) = &self.name {
            models::product::validate_name(name)?;
        }
        if let Some(price) = self.price {
            models::product::validate_price(price)?;
        }
        Ok(())
    }

    /// Apply onto `product`, replacing the image when one is given.
    pub fn apply(self, product: &mut Product, image: Option<ProductImage>) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(image) = image {
            product.image = image;
        }
    }
}

/// A product with its category record joined in place of the id.
///
/// `category` is `None` when the referenced category no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<Category>,
    pub image: ProductImage,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub updated_at: sea_orm::prelude::DateTimeWithTimeZone,
}

impl ProductWithCategory {
    pub fn join(product: Product, category: Option<Category>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            category,
            image: product.image,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        let now = chrono::Utc::now().into();
        Product {
            id: Uuid::new_v4(),
            name: "Runner".into(),
            description: Some("light".into()),
            price: 10.0,
            category: Uuid::new_v4(),
            image: ProductImage { url: "u1".into(), local_path: "p1".into() },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn patch_distinguishes_absent_from_null_description() {
        let mut p = product();
        ProductPatch::default().apply(&mut p, None);
        assert_eq!(p.description.as_deref(), Some("light"));

        ProductPatch { description: Some(None), ..Default::default() }.apply(&mut p, None);
        assert_eq!(p.description, None);
    }

    #[test]
    fn patch_replaces_image_only_when_given() {
        let mut p = product();
        ProductPatch { price: Some(12.5), ..Default::default() }.apply(&mut p, None);
        assert_eq!(p.price, 12.5);
        assert_eq!(p.image.url, "u1");

        let img = ProductImage { url: "u2".into(), local_path: "p2".into() };
        ProductPatch::default().apply(&mut p, Some(img.clone()));
        assert_eq!(p.image, img);
    }

    #[test]
    fn patch_validation_rejects_negative_price_and_blank_name() {
        assert!(ProductPatch { price: Some(-0.5), ..Default::default() }.validate().is_err());
        assert!(ProductPatch { name: Some(" ".into()), ..Default::default() }.validate().is_err());
        assert!(ProductPatch::default().validate().is_ok());
    }

    #[test]
    fn joined_product_serializes_category_object() {
        let p = product();
        let now = chrono::Utc::now().into();
        let cat = Category { id: p.category, name: "Shoes".into(), created_at: now, updated_at: now };
        let json = serde_json::to_value(ProductWithCategory::join(p, Some(cat))).unwrap();
        assert_eq!(json["category"]["name"], "Shoes");
        assert!(json.get("createdAt").is_some());
    }
}
