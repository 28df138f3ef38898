use domain_orders::{OrderService, PgOrderRepository};

use crate::state::AppState;

pub fn service(state: &AppState) -> OrderService<PgOrderRepository> {
    OrderService::new(PgOrderRepository::new(state.db.clone()))
}
