use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::ProductImage;

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateImageRequest {
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
    /// Only `true` is meaningful: it makes this image the product's primary.
    pub is_primary: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductImageList {
    #[schema(value_type = Vec<ProductImage>)]
    pub items: Vec<ProductImage>,
}

/// Multipart body for single uploads.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImageUpload {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Multipart body for bulk uploads; repeat the `images` field.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct BulkImageUpload {
    #[schema(value_type = Vec<String>)]
    pub images: Vec<Vec<u8>>,
}
