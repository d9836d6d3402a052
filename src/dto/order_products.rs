use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::OrderProduct;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateOrderProductRequest {
    pub order_id: i32,
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateOrderProductRequest {
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderProductList {
    #[schema(value_type = Vec<OrderProduct>)]
    pub items: Vec<OrderProduct>,
}
