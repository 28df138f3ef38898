use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A product held in the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    /// Unique across all products
    pub title: String,
    pub description: String,
    pub price: i32,
    /// On-hand stock; orders reserve from it
    pub quantity: i32,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: i32,
}

/// DTO for replacing every field of a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    pub description: String,
    #[validate(range(min = 0))]
    pub price: i32,
    #[validate(range(min = 0))]
    pub quantity: i32,
}

impl Product {
    pub fn new(id: i32, input: CreateProduct) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
        }
    }

    /// Full overwrite; the id is kept.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        self.title = update.title;
        self.description = update.description;
        self.price = update.price;
        self.quantity = update.quantity;
    }
}
