use domain_products::{PgProductRepository, ProductService};

use crate::state::AppState;

pub fn service(state: &AppState) -> ProductService<PgProductRepository> {
    ProductService::new(PgProductRepository::new(state.db.clone()))
}
