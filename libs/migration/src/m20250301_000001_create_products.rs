use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(
                        ColumnDef::new(Products::Title)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(text(Products::Description))
                    .col(integer(Products::Price))
                    .col(integer(Products::Quantity).default(0))
                    .to_owned(),
            )
            .await?;

        // Mirrors the service-level rules on stock and price
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE products
                    ADD CONSTRAINT chk_products_quantity_non_negative CHECK (quantity >= 0),
                    ADD CONSTRAINT chk_products_price_non_negative CHECK (price >= 0)
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_price")
                    .table(Products::Table)
                    .col(Products::Price)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Products {
    Table,
    Id,
    Title,
    Description,
    Price,
    Quantity,
}
