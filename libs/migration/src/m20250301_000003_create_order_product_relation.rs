use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_products::Products;
use crate::m20250301_000002_create_orders::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderProductRelation::Table)
                    .if_not_exists()
                    .col(pk_auto(OrderProductRelation::Id))
                    .col(integer(OrderProductRelation::OrderId))
                    .col(integer(OrderProductRelation::ProductId))
                    .col(integer(OrderProductRelation::ProductCount).default(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_product_relation_order_id")
                            .from(OrderProductRelation::Table, OrderProductRelation::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_product_relation_product_id")
                            .from(OrderProductRelation::Table, OrderProductRelation::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one line per (order, product); repeat additions merge into it
        manager
            .create_index(
                Index::create()
                    .name("idx_unique_order_product")
                    .table(OrderProductRelation::Table)
                    .col(OrderProductRelation::OrderId)
                    .col(OrderProductRelation::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_product_relation_product_id")
                    .table(OrderProductRelation::Table)
                    .col(OrderProductRelation::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE order_product_relation \
                 ADD CONSTRAINT chk_order_product_relation_count_positive CHECK (product_count >= 1)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderProductRelation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrderProductRelation {
    Table,
    Id,
    OrderId,
    ProductId,
    ProductCount,
}
