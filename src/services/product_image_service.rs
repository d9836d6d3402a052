use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};

use crate::{
    dto::product_images::{ProductImageList, UpdateImageRequest},
    entity::{
        product_images::{ActiveModel, Column, Entity as ProductImages, Model as ImageModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    models::ProductImage,
    response::{ApiResponse, Meta},
    storage::UploadedFile,
    state::AppState,
};

pub async fn list_images(
    state: &AppState,
    product_id: i32,
) -> AppResult<ApiResponse<ProductImageList>> {
    ensure_product(&state.orm, product_id).await?;
    let items = ProductImages::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_asc(Column::DisplayOrder)
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductImage::from)
        .collect();

    Ok(ApiResponse::success(
        "Images",
        ProductImageList { items },
        Some(Meta::empty()),
    ))
}

pub async fn upload_image(
    state: &AppState,
    product_id: i32,
    file: UploadedFile,
) -> AppResult<ApiResponse<ProductImage>> {
    let mut images = store_and_insert(state, product_id, vec![file]).await?;
    let image = images
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("image insert returned no row")))?;
    Ok(ApiResponse::success(
        "Image uploaded",
        image.into(),
        Some(Meta::empty()),
    ))
}

pub async fn upload_images_bulk(
    state: &AppState,
    product_id: i32,
    files: Vec<UploadedFile>,
) -> AppResult<ApiResponse<ProductImageList>> {
    if files.is_empty() {
        return Err(AppError::BadRequest("No images were uploaded".into()));
    }
    let items = store_and_insert(state, product_id, files)
        .await?
        .into_iter()
        .map(ProductImage::from)
        .collect();
    Ok(ApiResponse::success(
        "Images uploaded",
        ProductImageList { items },
        Some(Meta::empty()),
    ))
}

/// Uploads an image and makes it the product's primary image.
pub async fn upload_main_image(
    state: &AppState,
    product_id: i32,
    file: UploadedFile,
) -> AppResult<ApiResponse<ProductImage>> {
    let uploaded = upload_image(state, product_id, file).await?;
    let image_id = uploaded
        .data
        .map(|image| image.id)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("upload returned no image")))?;
    set_primary(state, product_id, image_id).await
}

pub async fn update_image(
    state: &AppState,
    image_id: i32,
    payload: UpdateImageRequest,
) -> AppResult<ApiResponse<ProductImage>> {
    if payload.is_primary == Some(false) {
        return Err(AppError::BadRequest(
            "Mark another image as primary instead of clearing the flag".into(),
        ));
    }

    let existing = find_image(&state.orm, image_id).await?;
    let product_id = existing.product_id;
    let mut image = existing.clone();
    if let Some(display_order) = payload.display_order {
        let mut active: ActiveModel = existing.into();
        active.display_order = Set(display_order);
        image = active.update(&state.orm).await?;
    }

    if payload.is_primary == Some(true) {
        return set_primary(state, product_id, image_id).await;
    }

    Ok(ApiResponse::success(
        "Updated",
        image.into(),
        Some(Meta::empty()),
    ))
}

/// Makes `image_id` the only primary image of `product_id`.
///
/// A single UPDATE assigns `is_primary = (id = image_id)` to every image of
/// the product, so concurrent calls can never leave zero or two primaries.
pub async fn set_primary(
    state: &AppState,
    product_id: i32,
    image_id: i32,
) -> AppResult<ApiResponse<ProductImage>> {
    let txn = state.orm.begin().await?;

    let mut image = ProductImages::find_by_id(image_id)
        .filter(Column::ProductId.eq(product_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Image"))?;

    ProductImages::update_many()
        .col_expr(Column::IsPrimary, Expr::col(Column::Id).eq(image_id))
        .filter(Column::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    sync_main_image(&txn, product_id, Some(image.url.clone())).await?;

    txn.commit().await?;
    image.is_primary = true;

    tracing::info!(product_id, image_id, "primary image set");
    Ok(ApiResponse::success(
        "Primary image set",
        image.into(),
        Some(Meta::empty()),
    ))
}

/// Deletes one image row and its file. A deleted primary is not replaced.
pub async fn delete_image(
    state: &AppState,
    image_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let image = find_image(&txn, image_id).await?;

    ProductImages::delete_by_id(image_id).exec(&txn).await?;
    if image.is_primary {
        Products::update_many()
            .col_expr(ProdCol::Image, Expr::value(Option::<String>::None))
            .col_expr(ProdCol::UpdatedAt, Expr::value(Utc::now()))
            .filter(ProdCol::Id.eq(image.product_id))
            .filter(ProdCol::Image.eq(image.url.clone()))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    state.images.remove(&image.url).await;
    tracing::info!(image_id, product_id = image.product_id, "image deleted");
    Ok(ApiResponse::deleted("Deleted"))
}

/// Deletes every image row of a product inside `txn`, returning the file
/// URLs to remove once the transaction has committed.
pub async fn delete_all_for_product(
    txn: &DatabaseTransaction,
    product_id: i32,
) -> AppResult<Vec<String>> {
    let urls = ProductImages::find()
        .filter(Column::ProductId.eq(product_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|image| image.url)
        .collect();
    ProductImages::delete_many()
        .filter(Column::ProductId.eq(product_id))
        .exec(txn)
        .await?;
    Ok(urls)
}

async fn store_and_insert(
    state: &AppState,
    product_id: i32,
    files: Vec<UploadedFile>,
) -> AppResult<Vec<ImageModel>> {
    ensure_product(&state.orm, product_id).await?;
    // Reject the whole batch before anything touches the disk.
    for file in &files {
        state.images.check(file)?;
    }

    let mut urls = Vec::with_capacity(files.len());
    for file in &files {
        match state.images.save(file).await {
            Ok(stored) => urls.push(stored.url),
            Err(err) => {
                remove_files(state, &urls).await;
                return Err(err);
            }
        }
    }

    match insert_rows(state, product_id, &urls).await {
        Ok(images) => {
            tracing::info!(product_id, count = images.len(), "images uploaded");
            Ok(images)
        }
        Err(err) => {
            remove_files(state, &urls).await;
            Err(err)
        }
    }
}

async fn insert_rows(state: &AppState, product_id: i32, urls: &[String]) -> AppResult<Vec<ImageModel>> {
    let txn = state.orm.begin().await?;

    let has_primary = ProductImages::find()
        .filter(Column::ProductId.eq(product_id))
        .filter(Column::IsPrimary.eq(true))
        .count(&txn)
        .await?
        > 0;
    let mut display_order = ProductImages::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_desc(Column::DisplayOrder)
        .one(&txn)
        .await?
        .map_or(0, |last| last.display_order + 1);

    let mut images = Vec::with_capacity(urls.len());
    for (index, url) in urls.iter().enumerate() {
        let promote = !has_primary && index == 0;
        let image = ActiveModel {
            product_id: Set(product_id),
            url: Set(url.clone()),
            is_primary: Set(promote),
            display_order: Set(display_order),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        if promote {
            sync_main_image(&txn, product_id, Some(url.clone())).await?;
        }
        display_order += 1;
        images.push(image);
    }

    txn.commit().await?;
    Ok(images)
}

pub async fn remove_files(state: &AppState, urls: &[String]) {
    for url in urls {
        state.images.remove(url).await;
    }
}

async fn sync_main_image<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    url: Option<String>,
) -> AppResult<()> {
    Products::update_many()
        .col_expr(ProdCol::Image, Expr::value(url))
        .col_expr(ProdCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(ProdCol::Id.eq(product_id))
        .exec(db)
        .await?;
    Ok(())
}

async fn find_image<C: ConnectionTrait>(db: &C, image_id: i32) -> AppResult<ImageModel> {
    ProductImages::find_by_id(image_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Image"))
}

async fn ensure_product<C: ConnectionTrait>(db: &C, product_id: i32) -> AppResult<()> {
    if Products::find_by_id(product_id).one(db).await?.is_none() {
        return Err(AppError::not_found("Product"));
    }
    Ok(())
}
