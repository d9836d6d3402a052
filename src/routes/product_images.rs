use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::product_images::{BulkImageUpload, ImageUpload, ProductImageList, UpdateImageRequest},
    error::{AppError, AppResult},
    middleware::{auth::AdminPrincipal, extract::Path, validate::ValidatedJson},
    models::ProductImage,
    response::ApiResponse,
    services::product_image_service,
    state::AppState,
    storage::UploadedFile,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/products/{product_id}/images",
            get(list_images).post(upload_image),
        )
        .route("/products/{product_id}/images/bulk", post(upload_images_bulk))
        .route(
            "/products/{product_id}/images/{image_id}/primary",
            put(set_primary),
        )
        .route("/images/{image_id}", put(update_image).delete(delete_image))
}

/// Collects every file sent under `field`; other fields are ignored.
pub async fn read_files(mut multipart: Multipart, field: &str) -> AppResult<Vec<UploadedFile>> {
    let mut files = Vec::new();
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.body_text()))?
    {
        if part.name() != Some(field) {
            continue;
        }
        let file_name = part.file_name().map(str::to_string);
        let content_type = part.content_type().map(str::to_string);
        let bytes = part
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(err.body_text()))?;
        files.push(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }
    Ok(files)
}

/// Reads exactly one file from `field`.
pub async fn single_file(multipart: Multipart, field: &str) -> AppResult<UploadedFile> {
    let mut files = read_files(multipart, field).await?;
    match files.len() {
        1 => files
            .pop()
            .ok_or_else(|| AppError::BadRequest(format!("Missing '{field}' file"))),
        0 => Err(AppError::BadRequest(format!("Missing '{field}' file"))),
        _ => Err(AppError::BadRequest(format!(
            "Expected a single '{field}' file"
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/api/productImages/products/{product_id}/images",
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Images ordered by display order", body = ApiResponse<ProductImageList>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Product Images"
)]
pub async fn list_images(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> AppResult<Json<ApiResponse<ProductImageList>>> {
    let resp = product_image_service::list_images(&state, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/productImages/products/{product_id}/images",
    params(("product_id" = i32, Path, description = "Product ID")),
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded", body = ApiResponse<ProductImage>),
        (status = 400, description = "Missing or unsupported file"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(product_id): Path<i32>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductImage>>)> {
    let file = single_file(multipart, "image").await?;
    let resp = product_image_service::upload_image(&state, product_id, file).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/productImages/products/{product_id}/images/bulk",
    params(("product_id" = i32, Path, description = "Product ID")),
    request_body(content = BulkImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Images uploaded", body = ApiResponse<ProductImageList>),
        (status = 400, description = "No files or an unsupported file"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn upload_images_bulk(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(product_id): Path<i32>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductImageList>>)> {
    let files = read_files(multipart, "images").await?;
    let resp = product_image_service::upload_images_bulk(&state, product_id, files).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/productImages/images/{image_id}",
    params(("image_id" = i32, Path, description = "Image ID")),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Image updated", body = ApiResponse<ProductImage>),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Image not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn update_image(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(image_id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateImageRequest>,
) -> AppResult<Json<ApiResponse<ProductImage>>> {
    let resp = product_image_service::update_image(&state, image_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/productImages/products/{product_id}/images/{image_id}/primary",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
        ("image_id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Primary image set", body = ApiResponse<ProductImage>),
        (status = 404, description = "Image not found for this product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn set_primary(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path((product_id, image_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<ProductImage>>> {
    let resp = product_image_service::set_primary(&state, product_id, image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/productImages/images/{image_id}",
    params(("image_id" = i32, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image deleted"),
        (status = 404, description = "Image not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(image_id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_image_service::delete_image(&state, image_id).await?;
    Ok(Json(resp))
}
