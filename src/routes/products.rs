use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::{
    dto::product_images::ImageUpload,
    dto::products::{
        AttachColorsRequest, AttachSizesRequest, CreateProductRequest, ProductColorList,
        ProductDetail, ProductList, ProductSizeList, UpdateProductRequest,
    },
    error::AppResult,
    middleware::{
        auth::AdminPrincipal,
        extract::{Path, Query},
        validate::ValidatedJson,
    },
    models::{Product, ProductImage},
    response::ApiResponse,
    routes::{params::ProductQuery, product_images::single_file},
    services::{product_image_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/colors", get(list_colors).post(attach_colors))
        .route("/{id}/colors/{color_id}", delete(detach_color))
        .route("/{id}/sizes", get(list_sizes).post(attach_sizes))
        .route("/{id}/sizes/{size_id}", delete(detach_size))
        .route("/{id}/image", post(upload_main_image))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with category, colors, sizes and images", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Category, color or size not found"),
        (status = 409, description = "Product name already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductDetail>>)> {
    let resp = product_service::create_product(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product name already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product and its images"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product is referenced by orders"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/colors",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Colors of a product", body = ApiResponse<ProductColorList>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn list_colors(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ProductColorList>>> {
    let resp = product_service::list_colors(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/colors",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = AttachColorsRequest,
    responses(
        (status = 200, description = "Colors attached", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product or color not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn attach_colors(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<AttachColorsRequest>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::attach_colors(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/colors/{color_id}",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("color_id" = i32, Path, description = "Color ID")
    ),
    responses(
        (status = 200, description = "Color detached"),
        (status = 404, description = "Product not found or color not attached"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn detach_color(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path((id, color_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::detach_color(&state, id, color_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/sizes",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Sizes of a product", body = ApiResponse<ProductSizeList>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn list_sizes(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ProductSizeList>>> {
    let resp = product_service::list_sizes(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/sizes",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = AttachSizesRequest,
    responses(
        (status = 200, description = "Sizes attached", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product or size not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn attach_sizes(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<AttachSizesRequest>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::attach_sizes(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/sizes/{size_id}",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("size_id" = i32, Path, description = "Size ID")
    ),
    responses(
        (status = 200, description = "Size detached"),
        (status = 404, description = "Product not found or size not attached"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn detach_size(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path((id, size_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::detach_size(&state, id, size_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/image",
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Uploaded and set as primary image", body = ApiResponse<ProductImage>),
        (status = 400, description = "Missing or unsupported file"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn upload_main_image(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductImage>>)> {
    let file = single_file(multipart, "image").await?;
    let resp = product_image_service::upload_main_image(&state, id, file).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
