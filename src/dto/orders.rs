use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Order, OrderProduct, OrderStatus};

/// Customer details copied onto the order row at checkout.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct OrderContact {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 30))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
}

/// A cart line as sent by the storefront. Color and size are display names.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema, Validate)]
pub struct CartLine {
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct CheckoutRequest {
    #[validate(nested)]
    pub contact: OrderContact,
    #[validate(length(min = 1), nested)]
    pub products: Vec<CartLine>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddOrderProductsRequest {
    #[validate(length(min = 1), nested)]
    pub products: Vec<CartLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Stored line-item plus the names it references.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLine {
    #[serde(flatten)]
    pub item: OrderProduct,
    pub product_name: String,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
