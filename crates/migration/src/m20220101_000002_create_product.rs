//! Create `product` table.
//!
//! `category` holds a category id but carries no foreign key: deleting a
//! category leaves its products in place. `image` is a JSON document
//! `{url, localPath}` owned by the row.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(string_len(Product::Name, 256).not_null())
                    .col(text_null(Product::Description))
                    .col(double(Product::Price).not_null().default(0.0))
                    .col(uuid(Product::Category).not_null())
                    .col(json_binary(Product::Image).not_null())
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Product::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product {
    Table,
    Id,
    Name,
    Description,
    Price,
    Category,
    Image,
    CreatedAt,
    UpdatedAt,
}
