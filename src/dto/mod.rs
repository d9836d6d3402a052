pub mod auth;
pub mod catalog;
pub mod order_products;
pub mod orders;
pub mod product_images;
pub mod products;
pub mod users;
