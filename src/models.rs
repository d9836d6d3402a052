use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{
    admins, categories, colors, order_products, orders, product_images, products, sizes, users,
};

pub use crate::entity::orders::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Color {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Size {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub slug: String,
    pub image: Option<String>,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub url: String,
    pub is_primary: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Customer profile. The password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Admin {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub reference: String,
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    pub address: String,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderProduct {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: f64,
    pub color_id: Option<i32>,
    pub size_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<categories::Model> for Category {
    fn from(m: categories::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            slug: m.slug,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<colors::Model> for Color {
    fn from(m: colors::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            code: m.code,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<sizes::Model> for Size {
    fn from(m: sizes::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<products::Model> for Product {
    fn from(m: products::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            stock: m.stock,
            slug: m.slug,
            image: m.image,
            category_id: m.category_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<product_images::Model> for ProductImage {
    fn from(m: product_images::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            url: m.url,
            is_primary: m.is_primary,
            display_order: m.display_order,
            created_at: m.created_at,
        }
    }
}

impl From<users::Model> for User {
    fn from(m: users::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone: m.phone,
            city: m.city,
            address: m.address,
            created_at: m.created_at,
        }
    }
}

impl From<admins::Model> for Admin {
    fn from(m: admins::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            created_at: m.created_at,
        }
    }
}

impl From<orders::Model> for Order {
    fn from(m: orders::Model) -> Self {
        Self {
            id: m.id,
            reference: m.reference,
            user_id: m.user_id,
            first_name: m.first_name,
            last_name: m.last_name,
            phone: m.phone,
            city: m.city,
            address: m.address,
            total: m.total,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<order_products::Model> for OrderProduct {
    fn from(m: order_products::Model) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            product_id: m.product_id,
            quantity: m.quantity,
            price: m.price,
            color_id: m.color_id,
            size_id: m.size_id,
            created_at: m.created_at,
        }
    }
}

/// Lowercase, ASCII-alphanumeric words joined by `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
