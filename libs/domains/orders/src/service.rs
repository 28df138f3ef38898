//! Order Service - stock reservation and order composition

use std::sync::Arc;
use tracing::instrument;

use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderStatus, OrderSummary};
use crate::repository::{OrderRepository, OrderUnitOfWork};

/// Creates and extends orders, reserving product stock for every line.
///
/// A reservation reads the product under a row lock, checks stock, and writes
/// the decrement together with the order line in one unit of work. Any
/// failure drops the unit of work, so nothing is persisted.
pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// New order with a single line reserving `product_count` of `product_id`
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        product_id: i32,
        product_count: i32,
        status: OrderStatus,
    ) -> OrderResult<Order> {
        ensure_positive(product_count)?;

        let mut uow = self.repository.begin().await?;

        let available = reserve(&mut uow, product_id, product_count).await?;
        let header = uow.insert_order(status).await?;
        uow.insert_line(header.id, product_id, product_count).await?;

        let order = load_committed(uow, header.id).await?;
        tracing::info!(
            order_id = order.id,
            product_id,
            product_count,
            remaining = available - product_count,
            "Order created"
        );
        Ok(order)
    }

    /// Reserve more stock for an existing order.
    ///
    /// Stock is checked before the order is looked up, so a request against a
    /// missing order can still fail with `InsufficientStock`. A product already
    /// in the order gets its line's count increased instead of a second line.
    #[instrument(skip(self))]
    pub async fn add_product_to_order(
        &self,
        order_id: i32,
        product_id: i32,
        product_count: i32,
    ) -> OrderResult<Order> {
        ensure_positive(product_count)?;

        let mut uow = self.repository.begin().await?;

        let product = uow
            .lock_product(product_id)
            .await?
            .ok_or(OrderError::ProductNotFound(product_id))?;
        check_stock(&product, product_count)?;

        uow.lock_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        let merged = match uow.find_line(order_id, product_id).await? {
            Some(line) => Some((line.id, merged_count(line.product_count, product_count)?)),
            None => None,
        };

        uow.set_product_quantity(product_id, product.quantity - product_count)
            .await?;

        match merged {
            Some((line_id, total)) => {
                uow.set_line_count(line_id, total).await?;
            }
            None => {
                uow.insert_line(order_id, product_id, product_count).await?;
            }
        }

        let order = load_committed(uow, order_id).await?;
        tracing::info!(order_id, product_id, product_count, "Product added to order");
        Ok(order)
    }

    /// All orders, newest first
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> OrderResult<Vec<Order>> {
        self.repository.list().await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: i32) -> OrderResult<Order> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))
    }

    /// Any status may replace any other, including itself
    #[instrument(skip(self))]
    pub async fn set_order_status(
        &self,
        id: i32,
        status: OrderStatus,
    ) -> OrderResult<OrderSummary> {
        let summary = self
            .repository
            .set_status(id, status)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;

        tracing::info!(order_id = id, status = %status, "Order status changed");
        Ok(summary)
    }
}

fn ensure_positive(product_count: i32) -> OrderResult<()> {
    if product_count < 1 {
        return Err(OrderError::Validation(format!(
            "product_count must be at least 1, got {product_count}"
        )));
    }
    Ok(())
}

fn merged_count(current: i32, added: i32) -> OrderResult<i32> {
    current.checked_add(added).ok_or_else(|| {
        OrderError::Validation(format!(
            "product_count overflow: line already holds {current}, cannot add {added}"
        ))
    })
}

fn check_stock(product: &domain_products::Product, requested: i32) -> OrderResult<()> {
    if product.quantity < requested {
        return Err(OrderError::InsufficientStock {
            product_id: product.id,
            available: product.quantity,
            requested,
        });
    }
    Ok(())
}

/// Lock the product, check stock, and write the decrement. Returns the
/// quantity that was available.
async fn reserve<U: OrderUnitOfWork>(
    uow: &mut U,
    product_id: i32,
    product_count: i32,
) -> OrderResult<i32> {
    let product = uow
        .lock_product(product_id)
        .await?
        .ok_or(OrderError::ProductNotFound(product_id))?;
    check_stock(&product, product_count)?;

    uow.set_product_quantity(product_id, product.quantity - product_count)
        .await?;
    Ok(product.quantity)
}

async fn load_committed<U: OrderUnitOfWork>(mut uow: U, order_id: i32) -> OrderResult<Order> {
    let order = uow
        .load_order(order_id)
        .await?
        .ok_or(OrderError::OrderNotFound(order_id))?;
    uow.commit().await?;
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryOrderRepository;
    use domain_products::{
        CreateProduct, InMemoryProductRepository, ProductRepository, UpdateProduct,
    };

    struct Fixture {
        products: InMemoryProductRepository,
        service: OrderService<InMemoryOrderRepository>,
    }

    impl Fixture {
        fn new() -> Self {
            let products = InMemoryProductRepository::new();
            let service = OrderService::new(InMemoryOrderRepository::new(&products));
            Self { products, service }
        }

        async fn product(&self, title: &str, quantity: i32) -> i32 {
            self.products
                .create(CreateProduct {
                    title: title.into(),
                    description: format!("{title} description"),
                    price: 100,
                    quantity,
                })
                .await
                .unwrap()
                .id
        }

        async fn stock(&self, id: i32) -> i32 {
            self.products.get_by_id(id).await.unwrap().unwrap().quantity
        }
    }

    #[tokio::test]
    async fn test_create_order_reserves_stock() {
        let fx = Fixture::new();
        let clock = fx.product("Clock", 50_000).await;

        let order = fx
            .service
            .create_order(clock, 20, OrderStatus::Sent)
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Sent);
        assert_eq!(order.products_details.len(), 1);
        assert_eq!(order.products_details[0].product_count, 20);
        assert_eq!(order.products_details[0].product.title, "Clock");
        assert_eq!(fx.stock(clock).await, 49_980);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let fx = Fixture::new();
        let clock = fx.product("Clock", 2).await;

        let result = fx.service.create_order(clock, 20, OrderStatus::Sent).await;

        match result {
            Err(err @ OrderError::InsufficientStock { available: 2, .. }) => {
                assert!(err.to_string().contains("only 2"));
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(fx.stock(clock).await, 2);
        assert!(fx.service.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_for_missing_product() {
        let fx = Fixture::new();
        assert!(matches!(
            fx.service.create_order(9, 1, OrderStatus::InProcess).await,
            Err(OrderError::ProductNotFound(9))
        ));
    }

    #[tokio::test]
    async fn test_zero_count_is_rejected() {
        let fx = Fixture::new();
        let clock = fx.product("Clock", 5).await;

        assert!(matches!(
            fx.service.create_order(clock, 0, OrderStatus::Sent).await,
            Err(OrderError::Validation(_))
        ));
        assert_eq!(fx.stock(clock).await, 5);
    }

    #[tokio::test]
    async fn test_adding_same_product_merges_lines() {
        let fx = Fixture::new();
        let clock = fx.product("Clock", 100).await;
        let order = fx
            .service
            .create_order(clock, 3, OrderStatus::InProcess)
            .await
            .unwrap();

        let order = fx
            .service
            .add_product_to_order(order.id, clock, 4)
            .await
            .unwrap();

        assert_eq!(order.products_details.len(), 1);
        assert_eq!(order.products_details[0].product_count, 7);
        assert_eq!(fx.stock(clock).await, 93);
    }

    #[tokio::test]
    async fn test_merge_past_i32_max_is_rejected_without_writes() {
        let fx = Fixture::new();
        let clock = fx.product("Clock", i32::MAX).await;
        let order = fx
            .service
            .create_order(clock, i32::MAX, OrderStatus::Sent)
            .await
            .unwrap();
        fx.products
            .update(
                clock,
                UpdateProduct {
                    title: "Clock".into(),
                    description: "restocked".into(),
                    price: 100,
                    quantity: 5,
                },
            )
            .await
            .unwrap();

        let result = fx.service.add_product_to_order(order.id, clock, 1).await;

        assert!(matches!(result, Err(OrderError::Validation(msg)) if msg.contains("overflow")));
        assert_eq!(fx.stock(clock).await, 5);
        let stored = fx.service.get_order(order.id).await.unwrap();
        assert_eq!(stored.line_for(clock).unwrap().product_count, i32::MAX);
    }

    #[tokio::test]
    async fn test_adding_new_product_appends_line() {
        let fx = Fixture::new();
        let clock = fx.product("Clock", 100).await;
        let lamp = fx.product("Lamp", 100).await;
        let order = fx
            .service
            .create_order(clock, 1, OrderStatus::InProcess)
            .await
            .unwrap();

        let order = fx
            .service
            .add_product_to_order(order.id, lamp, 20)
            .await
            .unwrap();

        assert_eq!(order.products_details.len(), 2);
        assert_eq!(order.line_for(lamp).unwrap().product_count, 20);
        assert_eq!(order.products_details[1].product.title, "Lamp");
        assert_eq!(fx.stock(lamp).await, 80);
    }

    #[tokio::test]
    async fn test_stock_is_checked_before_order_existence() {
        let fx = Fixture::new();
        let clock = fx.product("Clock", 1).await;

        assert!(matches!(
            fx.service.add_product_to_order(404, clock, 5).await,
            Err(OrderError::InsufficientStock { .. })
        ));
        assert!(matches!(
            fx.service.add_product_to_order(404, clock, 1).await,
            Err(OrderError::OrderNotFound(404))
        ));
        assert_eq!(fx.stock(clock).await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_order_is_not_found() {
        let fx = Fixture::new();
        assert!(matches!(
            fx.service.get_order(12).await,
            Err(OrderError::OrderNotFound(12))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let fx = Fixture::new();
        let clock = fx.product("Clock", 100).await;

        let mut ids = Vec::new();
        for _ in 0..3 {
            let order = fx
                .service
                .create_order(clock, 1, OrderStatus::InProcess)
                .await
                .unwrap();
            ids.push(order.id);
        }

        let listed: Vec<i32> = fx
            .service
            .list_orders()
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        ids.reverse();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_set_status_is_idempotent_and_unrestricted() {
        let fx = Fixture::new();
        let clock = fx.product("Clock", 10).await;
        let order = fx
            .service
            .create_order(clock, 1, OrderStatus::Delivered)
            .await
            .unwrap();

        let first = fx
            .service
            .set_order_status(order.id, OrderStatus::InProcess)
            .await
            .unwrap();
        let second = fx
            .service
            .set_order_status(order.id, OrderStatus::InProcess)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.status, OrderStatus::InProcess);
        assert_eq!(first.created_at, order.created_at);
        assert!(matches!(
            fx.service.set_order_status(99, OrderStatus::Sent).await,
            Err(OrderError::OrderNotFound(99))
        ));
    }
}
