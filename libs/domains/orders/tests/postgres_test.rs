//! Order flows against a real PostgreSQL database (testcontainers).
//!
//! Run with `cargo test -p domain_orders -- --ignored` when Docker is available.

use domain_orders::*;
use domain_products::{CreateProduct, PgProductRepository, ProductError, ProductRepository};
use test_utils::{TestDataBuilder, TestDatabase, assertions::assert_some};

struct Fixture {
    db: TestDatabase,
    products: PgProductRepository,
    service: OrderService<PgOrderRepository>,
    builder: TestDataBuilder,
}

impl Fixture {
    async fn new(test_name: &str) -> Self {
        let db = TestDatabase::new().await;
        Self {
            products: PgProductRepository::new(db.connection()),
            service: OrderService::new(PgOrderRepository::new(db.connection())),
            builder: TestDataBuilder::from_test_name(test_name),
            db,
        }
    }

    async fn product(&self, suffix: &str, quantity: i32) -> i32 {
        self.products
            .create(CreateProduct {
                title: self.builder.title(suffix),
                description: "Postgres test".into(),
                price: self.builder.price(quantity as u64),
                quantity,
            })
            .await
            .unwrap()
            .id
    }

    async fn stock(&self, id: i32) -> i32 {
        assert_some(self.products.get_by_id(id).await.unwrap(), "product").quantity
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_then_add_product_scenario() {
    let fx = Fixture::new("test_create_then_add_product_scenario").await;
    let clock = fx.product("clock", 50_000).await;
    let lamp = fx.product("lamp", 100).await;

    let order = fx
        .service
        .create_order(clock, 20, OrderStatus::Sent)
        .await
        .unwrap();
    assert_eq!(order.products_details.len(), 1);
    assert_eq!(fx.stock(clock).await, 49_980);

    let order = fx
        .service
        .add_product_to_order(order.id, lamp, 20)
        .await
        .unwrap();
    assert_eq!(order.products_details.len(), 2);

    let order = fx
        .service
        .add_product_to_order(order.id, clock, 5)
        .await
        .unwrap();
    assert_eq!(order.products_details.len(), 2);
    assert_eq!(order.line_for(clock).unwrap().product_count, 25);
    assert_eq!(fx.stock(clock).await, 49_975);
    assert_eq!(fx.stock(lamp).await, 80);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insufficient_stock_rolls_back() {
    let fx = Fixture::new("test_insufficient_stock_rolls_back").await;
    let clock = fx.product("clock", 2).await;

    let result = fx.service.create_order(clock, 20, OrderStatus::Sent).await;

    assert!(matches!(
        result,
        Err(OrderError::InsufficientStock { available: 2, requested: 20, .. })
    ));
    assert_eq!(fx.stock(clock).await, 2);
    assert!(fx.service.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_newest_first_and_status_change() {
    let fx = Fixture::new("test_list_newest_first_and_status_change").await;
    let clock = fx.product("clock", 10).await;

    let first = fx
        .service
        .create_order(clock, 1, OrderStatus::InProcess)
        .await
        .unwrap();
    let second = fx
        .service
        .create_order(clock, 1, OrderStatus::InProcess)
        .await
        .unwrap();

    let ids: Vec<i32> = fx
        .service
        .list_orders()
        .await
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, [second.id, first.id]);

    let summary = fx
        .service
        .set_order_status(first.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(summary.status, OrderStatus::Delivered);
    assert_eq!(
        fx.service.get_order(first.id).await.unwrap().status,
        OrderStatus::Delivered
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_truncate_clears_orders_and_restarts_ids() {
    let fx = Fixture::new("test_truncate_clears_orders_and_restarts_ids").await;
    let clock = fx.product("clock", 10).await;
    fx.service
        .create_order(clock, 2, OrderStatus::Sent)
        .await
        .unwrap();

    fx.db.truncate().await;

    assert!(fx.service.list_orders().await.unwrap().is_empty());
    assert!(fx.products.list().await.unwrap().is_empty());

    let clock = fx.product("clock", 10).await;
    assert_eq!(clock, 1);
    let order = fx
        .service
        .create_order(clock, 2, OrderStatus::Sent)
        .await
        .unwrap();
    assert_eq!(order.id, 1);
    assert_eq!(order.products_details[0].id, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_referenced_product_cannot_be_deleted() {
    let fx = Fixture::new("test_referenced_product_cannot_be_deleted").await;
    let clock = fx.product("clock", 10).await;
    fx.service
        .create_order(clock, 1, OrderStatus::Sent)
        .await
        .unwrap();

    assert!(matches!(
        fx.products.delete(clock).await,
        Err(ProductError::InUse(id)) if id == clock
    ));
}
