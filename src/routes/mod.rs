use axum::Router;

use crate::state::AppState;

pub mod admins;
pub mod auth;
pub mod categories;
pub mod colors;
pub mod doc;
pub mod health;
pub mod order_products;
pub mod orders;
pub mod params;
pub mod product_images;
pub mod products;
pub mod sizes;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/productImages", product_images::router())
        .nest("/orders", orders::router())
        .nest("/orderProducts", order_products::router())
        .nest("/categories", categories::router())
        .nest("/colors", colors::router())
        .nest("/size", sizes::router())
        .nest("/users", users::router())
        .nest("/admin", admins::router())
}
