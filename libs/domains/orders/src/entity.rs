//! Sea-ORM entities for the orders and order_product_relation tables

pub mod order {
    use crate::models::{OrderStatus, OrderSummary};
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "orders")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub status: OrderStatus,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::order_item::Entity")]
        Items,
    }

    impl Related<super::order_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Items.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for OrderSummary {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                status: model.status,
                created_at: model.created_at.into(),
            }
        }
    }
}

pub mod order_item {
    use crate::models::LineRef;
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "order_product_relation")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub order_id: i32,
        pub product_id: i32,
        pub product_count: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::order::Entity",
            from = "Column::OrderId",
            to = "super::order::Column::Id",
            on_delete = "Restrict"
        )]
        Order,
        #[sea_orm(
            belongs_to = "domain_products::entity::Entity",
            from = "Column::ProductId",
            to = "domain_products::entity::Column::Id",
            on_delete = "Restrict"
        )]
        Product,
    }

    impl Related<super::order::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Order.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for LineRef {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                product_count: model.product_count,
            }
        }
    }
}
