use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Order lifecycle status. Any status may follow any other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "in_process")]
    InProcess,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "delivered")]
    Delivered,
}

/// Product fields shown inside an order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub title: String,
    pub description: String,
    pub price: i32,
}

impl From<domain_products::Product> for ProductSnapshot {
    fn from(product: domain_products::Product) -> Self {
        Self {
            title: product.title,
            description: product.description,
            price: product.price,
        }
    }
}

/// Quantity of one product reserved by one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: i32,
    pub product_id: i32,
    pub product_count: i32,
    pub product: ProductSnapshot,
}

/// Order with its lines in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub products_details: Vec<OrderLine>,
}

impl Order {
    pub fn line_for(&self, product_id: i32) -> Option<&OrderLine> {
        self.products_details
            .iter()
            .find(|line| line.product_id == product_id)
    }
}

/// Order header without lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Existing line located inside a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef {
    pub id: i32,
    pub product_count: i32,
}

/// Query parameters for `POST /orders`
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreateOrderQuery {
    /// Product reserved by the first line
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub product_count: i32,
    pub order_status: OrderStatus,
}

/// Query parameters for `POST /orders/{id}/product`
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddProductQuery {
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub product_count: i32,
}

/// Query parameters for `PATCH /orders/{id}/status`
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderStatusQuery {
    pub order_status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_wire_values_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProcess).unwrap(),
            "\"in_process\""
        );
        assert_eq!(OrderStatus::from_str("delivered").unwrap(), OrderStatus::Delivered);
        assert!(OrderStatus::from_str("cancelled").is_err());
    }

    #[test]
    fn test_product_count_must_be_positive() {
        let query = AddProductQuery {
            product_id: 1,
            product_count: 0,
        };
        assert!(query.validate().is_err());

        let query = CreateOrderQuery {
            product_id: 1,
            product_count: 20,
            order_status: OrderStatus::Sent,
        };
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_line_for_finds_matching_product() {
        let order = Order {
            id: 1,
            status: OrderStatus::Sent,
            created_at: Utc::now(),
            products_details: vec![OrderLine {
                id: 4,
                product_id: 9,
                product_count: 2,
                product: ProductSnapshot {
                    title: "Clock".into(),
                    description: String::new(),
                    price: 10,
                },
            }],
        };

        assert_eq!(order.line_for(9).map(|l| l.id), Some(4));
        assert!(order.line_for(1).is_none());
    }
}
