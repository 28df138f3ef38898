use async_trait::async_trait;
use chrono::Utc;
use domain_products::{InMemoryProductRepository, Product, ProductTable};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{OrderError, OrderResult};
use crate::models::{LineRef, Order, OrderLine, OrderStatus, OrderSummary};

/// Repository trait for Order persistence
///
/// Reads and status changes run directly. Stock reservations go through a
/// [`OrderUnitOfWork`] obtained from [`begin`](OrderRepository::begin).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    type UnitOfWork: OrderUnitOfWork + 'static;

    /// Start a unit of work; dropping it without `commit` discards every write
    async fn begin(&self) -> OrderResult<Self::UnitOfWork>;

    /// All orders with their lines, newest first
    async fn list(&self) -> OrderResult<Vec<Order>>;

    async fn get_by_id(&self, id: i32) -> OrderResult<Option<Order>>;

    /// Overwrite the status; `None` when the order does not exist
    async fn set_status(&self, id: i32, status: OrderStatus)
    -> OrderResult<Option<OrderSummary>>;
}

/// One atomic reservation.
///
/// Rows returned by `lock_*` stay locked against other units of work until
/// this one commits or is dropped.
#[async_trait]
pub trait OrderUnitOfWork: Send {
    async fn lock_product(&mut self, product_id: i32) -> OrderResult<Option<Product>>;

    async fn lock_order(&mut self, order_id: i32) -> OrderResult<Option<OrderSummary>>;

    async fn set_product_quantity(&mut self, product_id: i32, quantity: i32) -> OrderResult<()>;

    /// Insert an order stamped with the current time
    async fn insert_order(&mut self, status: OrderStatus) -> OrderResult<OrderSummary>;

    async fn find_line(&mut self, order_id: i32, product_id: i32) -> OrderResult<Option<LineRef>>;

    async fn insert_line(
        &mut self,
        order_id: i32,
        product_id: i32,
        product_count: i32,
    ) -> OrderResult<LineRef>;

    async fn set_line_count(&mut self, line_id: i32, product_count: i32) -> OrderResult<()>;

    /// The order as it will look after commit
    async fn load_order(&mut self, order_id: i32) -> OrderResult<Option<Order>>;

    async fn commit(self) -> OrderResult<()>;
}

#[derive(Debug, Clone)]
struct LineRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_count: i32,
}

/// Orders and their lines
#[derive(Debug, Clone)]
pub struct OrderTable {
    orders: BTreeMap<i32, OrderSummary>,
    lines: BTreeMap<i32, LineRow>,
    next_order_id: i32,
    next_line_id: i32,
}

impl Default for OrderTable {
    fn default() -> Self {
        Self {
            orders: BTreeMap::new(),
            lines: BTreeMap::new(),
            next_order_id: 1,
            next_line_id: 1,
        }
    }
}

impl OrderTable {
    fn project(&self, products: &ProductTable, header: &OrderSummary) -> OrderResult<Order> {
        let products_details = self
            .lines
            .values()
            .filter(|line| line.order_id == header.id)
            .map(|line| {
                let product = products.get(line.product_id).ok_or_else(|| {
                    OrderError::Internal(format!(
                        "order line {} points at missing product {}",
                        line.id, line.product_id
                    ))
                })?;
                Ok(OrderLine {
                    id: line.id,
                    product_id: line.product_id,
                    product_count: line.product_count,
                    product: product.clone().into(),
                })
            })
            .collect::<OrderResult<Vec<_>>>()?;

        Ok(Order {
            id: header.id,
            status: header.status,
            created_at: header.created_at,
            products_details,
        })
    }
}

/// In-memory implementation of OrderRepository (for development/testing)
///
/// Shares the product rows of an [`InMemoryProductRepository`]. Tables are
/// always locked orders first, then products.
#[derive(Debug, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<Mutex<OrderTable>>,
    products: Arc<Mutex<ProductTable>>,
}

impl InMemoryOrderRepository {
    pub fn new(products: &InMemoryProductRepository) -> Self {
        Self {
            orders: Arc::new(Mutex::new(OrderTable::default())),
            products: products.table(),
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    type UnitOfWork = InMemoryOrderUnitOfWork;

    async fn begin(&self) -> OrderResult<Self::UnitOfWork> {
        let orders = self.orders.clone().lock_owned().await;
        let products = self.products.clone().lock_owned().await;

        Ok(InMemoryOrderUnitOfWork {
            staged_orders: orders.clone(),
            staged_products: products.clone(),
            orders,
            products,
        })
    }

    async fn list(&self) -> OrderResult<Vec<Order>> {
        let orders = self.orders.lock().await;
        let products = self.products.lock().await;

        let mut headers: Vec<&OrderSummary> = orders.orders.values().collect();
        headers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        headers
            .into_iter()
            .map(|header| orders.project(&products, header))
            .collect()
    }

    async fn get_by_id(&self, id: i32) -> OrderResult<Option<Order>> {
        let orders = self.orders.lock().await;
        let products = self.products.lock().await;

        orders
            .orders
            .get(&id)
            .map(|header| orders.project(&products, header))
            .transpose()
    }

    async fn set_status(
        &self,
        id: i32,
        status: OrderStatus,
    ) -> OrderResult<Option<OrderSummary>> {
        let mut orders = self.orders.lock().await;

        Ok(orders.orders.get_mut(&id).map(|header| {
            header.status = status;
            *header
        }))
    }
}

/// Holds both tables for its whole lifetime and writes to copies of them
pub struct InMemoryOrderUnitOfWork {
    orders: OwnedMutexGuard<OrderTable>,
    products: OwnedMutexGuard<ProductTable>,
    staged_orders: OrderTable,
    staged_products: ProductTable,
}

#[async_trait]
impl OrderUnitOfWork for InMemoryOrderUnitOfWork {
    async fn lock_product(&mut self, product_id: i32) -> OrderResult<Option<Product>> {
        Ok(self.staged_products.get(product_id).cloned())
    }

    async fn lock_order(&mut self, order_id: i32) -> OrderResult<Option<OrderSummary>> {
        Ok(self.staged_orders.orders.get(&order_id).copied())
    }

    async fn set_product_quantity(&mut self, product_id: i32, quantity: i32) -> OrderResult<()> {
        let product = self
            .staged_products
            .get_mut(product_id)
            .ok_or(OrderError::ProductNotFound(product_id))?;
        product.quantity = quantity;
        Ok(())
    }

    async fn insert_order(&mut self, status: OrderStatus) -> OrderResult<OrderSummary> {
        let table = &mut self.staged_orders;
        let header = OrderSummary {
            id: table.next_order_id,
            status,
            created_at: Utc::now(),
        };
        table.next_order_id += 1;
        table.orders.insert(header.id, header);
        Ok(header)
    }

    async fn find_line(&mut self, order_id: i32, product_id: i32) -> OrderResult<Option<LineRef>> {
        Ok(self
            .staged_orders
            .lines
            .values()
            .find(|line| line.order_id == order_id && line.product_id == product_id)
            .map(|line| LineRef {
                id: line.id,
                product_count: line.product_count,
            }))
    }

    async fn insert_line(
        &mut self,
        order_id: i32,
        product_id: i32,
        product_count: i32,
    ) -> OrderResult<LineRef> {
        if !self.staged_orders.orders.contains_key(&order_id) {
            return Err(OrderError::OrderNotFound(order_id));
        }
        if self.staged_products.get(product_id).is_none() {
            return Err(OrderError::ProductNotFound(product_id));
        }
        if self.find_line(order_id, product_id).await?.is_some() {
            return Err(OrderError::Internal(format!(
                "order {order_id} already has a line for product {product_id}"
            )));
        }

        let table = &mut self.staged_orders;
        let line = LineRow {
            id: table.next_line_id,
            order_id,
            product_id,
            product_count,
        };
        table.next_line_id += 1;
        table.lines.insert(line.id, line.clone());
        self.staged_products.add_reference(product_id);

        Ok(LineRef {
            id: line.id,
            product_count,
        })
    }

    async fn set_line_count(&mut self, line_id: i32, product_count: i32) -> OrderResult<()> {
        let line = self
            .staged_orders
            .lines
            .get_mut(&line_id)
            .ok_or_else(|| OrderError::Internal(format!("order line {line_id} does not exist")))?;
        line.product_count = product_count;
        Ok(())
    }

    async fn load_order(&mut self, order_id: i32) -> OrderResult<Option<Order>> {
        self.staged_orders
            .orders
            .get(&order_id)
            .map(|header| self.staged_orders.project(&self.staged_products, header))
            .transpose()
    }

    async fn commit(self) -> OrderResult<()> {
        let Self {
            mut orders,
            mut products,
            staged_orders,
            staged_products,
        } = self;

        *orders = staged_orders;
        *products = staged_products;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_products::{CreateProduct, ProductRepository};

    async fn setup() -> (InMemoryProductRepository, InMemoryOrderRepository, Product) {
        let products = InMemoryProductRepository::new();
        let orders = InMemoryOrderRepository::new(&products);
        let clock = products
            .create(CreateProduct {
                title: "Clock".into(),
                description: "Wall clock".into(),
                price: 300,
                quantity: 10,
            })
            .await
            .unwrap();
        (products, orders, clock)
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_discards_writes() {
        let (products, orders, clock) = setup().await;

        {
            let mut uow = orders.begin().await.unwrap();
            uow.set_product_quantity(clock.id, 0).await.unwrap();
            let header = uow.insert_order(OrderStatus::Sent).await.unwrap();
            uow.insert_line(header.id, clock.id, 10).await.unwrap();
        }

        assert_eq!(products.get_by_id(clock.id).await.unwrap().unwrap().quantity, 10);
        assert!(orders.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_committed_unit_of_work_is_visible() {
        let (products, orders, clock) = setup().await;

        let mut uow = orders.begin().await.unwrap();
        uow.set_product_quantity(clock.id, 7).await.unwrap();
        let header = uow.insert_order(OrderStatus::InProcess).await.unwrap();
        uow.insert_line(header.id, clock.id, 3).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(products.get_by_id(clock.id).await.unwrap().unwrap().quantity, 7);
        let order = orders.get_by_id(header.id).await.unwrap().unwrap();
        assert_eq!(order.products_details.len(), 1);
        assert_eq!(order.products_details[0].product.title, "Clock");
    }

    #[tokio::test]
    async fn test_lines_block_product_deletion() {
        let (products, orders, clock) = setup().await;

        let mut uow = orders.begin().await.unwrap();
        let header = uow.insert_order(OrderStatus::Sent).await.unwrap();
        uow.insert_line(header.id, clock.id, 1).await.unwrap();
        uow.commit().await.unwrap();

        assert!(matches!(
            products.delete(clock.id).await,
            Err(domain_products::ProductError::InUse(_))
        ));
    }

    #[tokio::test]
    async fn test_second_line_for_same_pair_is_rejected() {
        let (_products, orders, clock) = setup().await;

        let mut uow = orders.begin().await.unwrap();
        let header = uow.insert_order(OrderStatus::Sent).await.unwrap();
        uow.insert_line(header.id, clock.id, 1).await.unwrap();

        assert!(matches!(
            uow.insert_line(header.id, clock.id, 1).await,
            Err(OrderError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_set_status_on_missing_order_is_none() {
        let (_products, orders, _clock) = setup().await;
        assert!(orders.set_status(5, OrderStatus::Sent).await.unwrap().is_none());
    }
}
