//! API routes module

pub mod health;
pub mod orders;
pub mod products;

use axum::Router;
use domain_orders::{OrderRepository, OrderService};
use domain_products::{ProductRepository, ProductService};

use crate::state::AppState;

/// Domain routes backed by Postgres; nested under `/api` by the caller
pub fn routes(state: &AppState) -> Router {
    domain_routes(products::service(state), orders::service(state))
}

/// `/products` and `/orders` for any pair of repositories
pub fn domain_routes<P, O>(products: ProductService<P>, orders: OrderService<O>) -> Router
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    Router::new()
        .nest("/products", domain_products::handlers::router(products))
        .nest("/orders", domain_orders::handlers::router(orders))
}
