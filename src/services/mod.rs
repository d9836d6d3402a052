pub mod admin_service;
pub mod auth_service;
pub mod category_service;
pub mod color_service;
pub mod order_product_service;
pub mod order_service;
pub mod product_image_service;
pub mod product_service;
pub mod size_service;
pub mod user_service;
