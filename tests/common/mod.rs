#![allow(dead_code)]

use fashion_store_api::{
    config::AppConfig,
    db::{create_orm_conn, sync_schema},
    dto::{
        catalog::{CreateCategoryRequest, CreateColorRequest, CreateSizeRequest},
        orders::{CartLine, OrderContact},
        products::CreateProductRequest,
        users::{CreateAdminRequest, CreateUserRequest},
    },
    middleware::auth::Principal,
    services::{
        admin_service, category_service, color_service, product_service, size_service,
        user_service,
    },
    state::AppState,
    storage::UploadedFile,
};
use tempfile::TempDir;

pub const JWT_SECRET: &str = "test-secret";

/// Fresh in-memory database plus a private upload directory.
///
/// Keep the returned `TempDir` alive for as long as the state is used.
pub async fn setup_state() -> anyhow::Result<(AppState, TempDir)> {
    let uploads = tempfile::tempdir()?;
    let config = AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        jwt_ttl_hours: 1,
        upload_dir: uploads.path().to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        concurrency_limit: 16,
    };
    let orm = create_orm_conn(&config.database_url).await?;
    sync_schema(&orm).await?;
    Ok((AppState::new(orm, config), uploads))
}

pub async fn create_user(state: &AppState, email: &str) -> anyhow::Result<Principal> {
    let user = user_service::create_user(
        state,
        CreateUserRequest {
            first_name: "Amina".into(),
            last_name: "Benali".into(),
            email: email.into(),
            password: "secret123".into(),
            phone: None,
            city: None,
            address: None,
        },
    )
    .await?
    .data
    .expect("user data");
    Ok(Principal::user(user.id))
}

pub async fn create_admin(state: &AppState, email: &str) -> anyhow::Result<Principal> {
    let admin = admin_service::create_admin(
        state,
        CreateAdminRequest {
            name: "Root".into(),
            email: email.into(),
            password: "secret123".into(),
        },
    )
    .await?
    .data
    .expect("admin data");
    Ok(Principal::admin(admin.id))
}

pub async fn create_category(state: &AppState, name: &str) -> anyhow::Result<i32> {
    let category = category_service::create_category(
        state,
        CreateCategoryRequest {
            name: name.into(),
            description: None,
        },
    )
    .await?
    .data
    .expect("category data");
    Ok(category.id)
}

pub async fn create_color(state: &AppState, name: &str) -> anyhow::Result<i32> {
    let color = color_service::create_color(
        state,
        CreateColorRequest {
            name: name.into(),
            code: None,
        },
    )
    .await?
    .data
    .expect("color data");
    Ok(color.id)
}

pub async fn create_size(state: &AppState, name: &str) -> anyhow::Result<i32> {
    let size = size_service::create_size(
        state,
        CreateSizeRequest {
            name: name.into(),
            description: None,
        },
    )
    .await?
    .data
    .expect("size data");
    Ok(size.id)
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price: f64,
    category_id: Option<i32>,
) -> anyhow::Result<i32> {
    let product = product_service::create_product(
        state,
        CreateProductRequest {
            name: name.into(),
            description: None,
            price,
            stock: 10,
            category_id,
            color_ids: Vec::new(),
            size_ids: Vec::new(),
        },
    )
    .await?
    .data
    .expect("product data");
    Ok(product.product.id)
}

pub fn contact() -> OrderContact {
    OrderContact {
        first_name: "Amina".into(),
        last_name: "Benali".into(),
        phone: "0612345678".into(),
        city: "Rabat".into(),
        address: "5 Avenue Hassan II".into(),
    }
}

pub fn line(product_id: i32, quantity: i32, price: f64, color: Option<&str>, size: Option<&str>) -> CartLine {
    CartLine {
        product_id,
        quantity,
        price,
        color: color.map(str::to_string),
        size: size.map(str::to_string),
    }
}

pub fn png(name: &str) -> UploadedFile {
    UploadedFile {
        file_name: Some(name.into()),
        content_type: Some("image/png".into()),
        bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a].into(),
    }
}
