use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order with id={0} not found!")]
    OrderNotFound(i32),

    #[error("Product with id={0} not found!")]
    ProductNotFound(i32),

    #[error("There are only {available} products with id={product_id} left in the warehouse!")]
    InsufficientStock {
        product_id: i32,
        available: i32,
        requested: i32,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(_) | OrderError::ProductNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            OrderError::InsufficientStock {
                product_id,
                available,
                requested,
            } => AppError::InsufficientStock {
                message: err.to_string(),
                details: json!({
                    "product_id": product_id,
                    "available": available,
                    "requested": requested,
                }),
            },
            OrderError::Validation(msg) => AppError::BadRequest(msg),
            OrderError::Database(e) => AppError::Database(e),
            OrderError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_helpers::ErrorCode;

    #[test]
    fn test_insufficient_stock_states_available_quantity() {
        let err = OrderError::InsufficientStock {
            product_id: 1,
            available: 2,
            requested: 20,
        };
        assert_eq!(
            err.to_string(),
            "There are only 2 products with id=1 left in the warehouse!"
        );
        assert_eq!(
            AppError::from(err).classify(),
            (StatusCode::CONFLICT, ErrorCode::InsufficientStock)
        );
    }

    #[test]
    fn test_missing_order_and_product_are_not_found() {
        for err in [OrderError::OrderNotFound(3), OrderError::ProductNotFound(3)] {
            assert_eq!(AppError::from(err).classify().0, StatusCode::NOT_FOUND);
        }
    }
}
