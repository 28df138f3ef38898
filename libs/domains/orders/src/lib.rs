//! Orders Domain
//!
//! Orders reserve product stock. Creating an order or adding a product to one
//! decrements the product's quantity and records an order line in the same
//! unit of work; a request for more than is on hand fails with
//! `InsufficientStock` and changes nothing.
//!
//! Each (order, product) pair has at most one line: adding a product that is
//! already in the order increases that line's `product_count`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_orders::{handlers, OrderService, PgOrderRepository};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://localhost/warehouse").await?;
//!
//! let service = OrderService::new(PgOrderRepository::new(db));
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use handlers::ApiDoc;
pub use models::{Order, OrderLine, OrderStatus, OrderSummary, ProductSnapshot};
pub use postgres::PgOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository, OrderUnitOfWork};
pub use service::OrderService;
