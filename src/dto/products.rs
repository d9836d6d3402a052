use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Color, Product, ProductImage, Size};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub category_id: Option<i32>,
    #[serde(default)]
    pub color_ids: Vec<i32>,
    #[serde(default)]
    pub size_ids: Vec<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AttachColorsRequest {
    #[validate(length(min = 1))]
    pub color_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AttachSizesRequest {
    #[validate(length(min = 1))]
    pub size_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

/// Product with its category, variant names and gallery.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<CategorySummary>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub images: Vec<ProductImage>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductColorList {
    #[schema(value_type = Vec<Color>)]
    pub items: Vec<Color>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductSizeList {
    #[schema(value_type = Vec<Size>)]
    pub items: Vec<Size>,
}
