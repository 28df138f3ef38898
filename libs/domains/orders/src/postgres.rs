use async_trait::async_trait;
use domain_products::{Product, entity as product};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};

use crate::{
    entity::{order, order_item},
    error::{OrderError, OrderResult},
    models::{LineRef, Order, OrderLine, OrderStatus, OrderSummary},
    repository::{OrderRepository, OrderUnitOfWork},
};

/// PostgreSQL-backed order repository
#[derive(Clone)]
pub struct PgOrderRepository {
    db: DatabaseConnection,
}

impl PgOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Attach lines and product snapshots to `headers`, keeping their order.
///
/// Three queries regardless of how many orders are loaded.
async fn load_orders<C: ConnectionTrait>(
    conn: &C,
    headers: Vec<order::Model>,
) -> OrderResult<Vec<Order>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = headers.iter().map(|o| o.id).collect();
    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_item::Column::Id)
        .all(conn)
        .await?;

    let product_ids: BTreeSet<i32> = items.iter().map(|item| item.product_id).collect();
    let products: HashMap<i32, product::Model> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    let mut lines_by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
    for item in items {
        let snapshot = products.get(&item.product_id).cloned().ok_or_else(|| {
            OrderError::Internal(format!(
                "order line {} points at missing product {}",
                item.id, item.product_id
            ))
        })?;

        lines_by_order.entry(item.order_id).or_default().push(OrderLine {
            id: item.id,
            product_id: item.product_id,
            product_count: item.product_count,
            product: Product::from(snapshot).into(),
        });
    }

    Ok(headers
        .into_iter()
        .map(|header| Order {
            products_details: lines_by_order.remove(&header.id).unwrap_or_default(),
            id: header.id,
            status: header.status,
            created_at: header.created_at.into(),
        })
        .collect())
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    type UnitOfWork = PgOrderUnitOfWork;

    async fn begin(&self) -> OrderResult<Self::UnitOfWork> {
        let txn = self.db.begin().await?;
        Ok(PgOrderUnitOfWork { txn })
    }

    async fn list(&self) -> OrderResult<Vec<Order>> {
        let headers = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await?;

        load_orders(&self.db, headers).await
    }

    async fn get_by_id(&self, id: i32) -> OrderResult<Option<Order>> {
        let Some(header) = order::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        Ok(load_orders(&self.db, vec![header]).await?.pop())
    }

    async fn set_status(
        &self,
        id: i32,
        status: OrderStatus,
    ) -> OrderResult<Option<OrderSummary>> {
        let Some(model) = order::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: order::ActiveModel = model.into();
        active.status = Set(status);
        let updated = active.update(&self.db).await?;

        tracing::info!(order_id = id, status = %status, "Updated order status");
        Ok(Some(updated.into()))
    }
}

/// Transaction that takes `FOR UPDATE` row locks.
///
/// Dropping it without [`commit`](OrderUnitOfWork::commit) rolls back.
pub struct PgOrderUnitOfWork {
    txn: DatabaseTransaction,
}

#[async_trait]
impl OrderUnitOfWork for PgOrderUnitOfWork {
    async fn lock_product(&mut self, product_id: i32) -> OrderResult<Option<Product>> {
        let model = product::Entity::find_by_id(product_id)
            .lock_exclusive()
            .one(&self.txn)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn lock_order(&mut self, order_id: i32) -> OrderResult<Option<OrderSummary>> {
        let model = order::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&self.txn)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn set_product_quantity(&mut self, product_id: i32, quantity: i32) -> OrderResult<()> {
        let result = product::Entity::update_many()
            .col_expr(product::Column::Quantity, Expr::value(quantity))
            .filter(product::Column::Id.eq(product_id))
            .exec(&self.txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(OrderError::ProductNotFound(product_id));
        }
        Ok(())
    }

    async fn insert_order(&mut self, status: OrderStatus) -> OrderResult<OrderSummary> {
        // created_at comes from the column default
        let model = order::ActiveModel {
            status: Set(status),
            ..Default::default()
        }
        .insert(&self.txn)
        .await?;

        Ok(model.into())
    }

    async fn find_line(&mut self, order_id: i32, product_id: i32) -> OrderResult<Option<LineRef>> {
        let model = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .filter(order_item::Column::ProductId.eq(product_id))
            .one(&self.txn)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn insert_line(
        &mut self,
        order_id: i32,
        product_id: i32,
        product_count: i32,
    ) -> OrderResult<LineRef> {
        let model = order_item::ActiveModel {
            order_id: Set(order_id),
            product_id: Set(product_id),
            product_count: Set(product_count),
            ..Default::default()
        }
        .insert(&self.txn)
        .await?;

        Ok(model.into())
    }

    async fn set_line_count(&mut self, line_id: i32, product_count: i32) -> OrderResult<()> {
        order_item::Entity::update_many()
            .col_expr(order_item::Column::ProductCount, Expr::value(product_count))
            .filter(order_item::Column::Id.eq(line_id))
            .exec(&self.txn)
            .await?;
        Ok(())
    }

    async fn load_order(&mut self, order_id: i32) -> OrderResult<Option<Order>> {
        let Some(header) = order::Entity::find_by_id(order_id).one(&self.txn).await? else {
            return Ok(None);
        };

        Ok(load_orders(&self.txn, vec![header]).await?.pop())
    }

    async fn commit(self) -> OrderResult<()> {
        self.txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn header(id: i32) -> order::Model {
        order::Model {
            id,
            status: OrderStatus::Sent,
            created_at: Utc::now().into(),
        }
    }

    fn item(id: i32, order_id: i32, product_id: i32, product_count: i32) -> order_item::Model {
        order_item::Model {
            id,
            order_id,
            product_id,
            product_count,
        }
    }

    fn clock() -> product::Model {
        product::Model {
            id: 5,
            title: "Clock".into(),
            description: "Wall clock".into(),
            price: 300,
            quantity: 40,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_attaches_lines_with_snapshots() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![header(1)]])
            .append_query_results([vec![item(10, 1, 5, 20)]])
            .append_query_results([vec![clock()]])
            .into_connection();
        let repo = PgOrderRepository::new(db);

        let order = repo.get_by_id(1).await.unwrap().unwrap();

        assert_eq!(order.products_details.len(), 1);
        let line = &order.products_details[0];
        assert_eq!(line.product_count, 20);
        assert_eq!(line.product.title, "Clock");
        assert_eq!(line.product.price, 300);
    }

    #[tokio::test]
    async fn test_list_without_orders_runs_one_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<order::Model>::new()])
            .into_connection();
        let repo = PgOrderRepository::new(db);

        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_line_with_missing_product_is_internal_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![header(1)]])
            .append_query_results([vec![item(10, 1, 5, 20)]])
            .append_query_results([Vec::<product::Model>::new()])
            .into_connection();
        let repo = PgOrderRepository::new(db);

        assert!(matches!(
            repo.get_by_id(1).await,
            Err(OrderError::Internal(_))
        ));
    }
}
