use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Category, Color, Size};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateColorRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// Display code such as `#000000`.
    #[validate(length(max = 20))]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateColorRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 20))]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSizeRequest {
    #[validate(length(min = 1, max = 20))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateSizeRequest {
    #[validate(length(min = 1, max = 20))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ColorList {
    #[schema(value_type = Vec<Color>)]
    pub items: Vec<Color>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SizeList {
    #[schema(value_type = Vec<Size>)]
    pub items: Vec<Size>,
}
