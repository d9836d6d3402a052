use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, Func},
};

use crate::{
    dto::products::{
        AttachColorsRequest, AttachSizesRequest, CategorySummary, CreateProductRequest,
        ProductColorList, ProductDetail, ProductList, ProductSizeList, UpdateProductRequest,
    },
    entity::{
        Colors, ProductColors, ProductImages, ProductSizes, Sizes, colors, product_colors,
        product_images, product_sizes,
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        sizes,
    },
    error::{AppError, AppResult},
    models::{Color, Product, ProductImage, Size, slugify},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder, search_term},
    services::{category_service, product_image_service},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();

    if let Some(pattern) = search_term(&query.q) {
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(Column::Description))).like(pattern)),
        );
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };
    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    finder = finder.order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::for_page(&pagination, total)),
    ))
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<ProductDetail>> {
    let product = find_product(&state.orm, id).await?;
    let detail = load_detail(&state.orm, product).await?;
    Ok(ApiResponse::success("Product", detail, None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    let name = payload.name.trim().to_string();
    let txn = state.orm.begin().await?;

    ensure_name_free(&txn, &name, None).await?;
    if let Some(category_id) = payload.category_id {
        category_service::find_live(&txn, category_id).await?;
    }

    let now = Utc::now();
    let product = ActiveModel {
        slug: Set(slugify(&name)),
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(payload.stock),
        image: Set(None),
        category_id: Set(payload.category_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    attach_color_ids(&txn, product.id, &payload.color_ids).await?;
    attach_size_ids(&txn, product.id, &payload.size_ids).await?;
    let detail = load_detail(&txn, product).await?;
    txn.commit().await?;

    tracing::info!(product_id = detail.product.id, "product created");
    Ok(ApiResponse::success(
        "Product created",
        detail,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = find_product(&state.orm, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        ensure_name_free(&state.orm, &name, Some(id)).await?;
        active.slug = Set(slugify(&name));
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(category_id) = payload.category_id {
        category_service::find_live(&state.orm, category_id).await?;
        active.category_id = Set(Some(category_id));
    }
    active.updated_at = Set(Utc::now());

    let product = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

/// Hard delete. Rows go in one transaction; image files are removed after commit.
pub async fn delete_product(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let product = find_product(&txn, id).await?;

    let urls = product_image_service::delete_all_for_product(&txn, id).await?;
    ProductColors::delete_many()
        .filter(product_colors::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    ProductSizes::delete_many()
        .filter(product_sizes::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    product.delete(&txn).await?;
    txn.commit().await?;

    product_image_service::remove_files(state, &urls).await;
    tracing::info!(product_id = id, images = urls.len(), "product deleted");
    Ok(ApiResponse::deleted("Deleted"))
}

pub async fn list_colors(state: &AppState, id: i32) -> AppResult<ApiResponse<ProductColorList>> {
    let product = find_product(&state.orm, id).await?;
    let items = product
        .find_related(Colors)
        .filter(colors::Column::DeletedAt.is_null())
        .order_by_asc(colors::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Color::from)
        .collect();
    Ok(ApiResponse::success(
        "Product colors",
        ProductColorList { items },
        None,
    ))
}

pub async fn list_sizes(state: &AppState, id: i32) -> AppResult<ApiResponse<ProductSizeList>> {
    let product = find_product(&state.orm, id).await?;
    let items = product
        .find_related(Sizes)
        .filter(sizes::Column::DeletedAt.is_null())
        .order_by_asc(sizes::Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Size::from)
        .collect();
    Ok(ApiResponse::success(
        "Product sizes",
        ProductSizeList { items },
        None,
    ))
}

pub async fn attach_colors(
    state: &AppState,
    id: i32,
    payload: AttachColorsRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    let txn = state.orm.begin().await?;
    let product = find_product(&txn, id).await?;
    attach_color_ids(&txn, id, &payload.color_ids).await?;
    let detail = load_detail(&txn, product).await?;
    txn.commit().await?;
    Ok(ApiResponse::success("Colors attached", detail, Some(Meta::empty())))
}

pub async fn attach_sizes(
    state: &AppState,
    id: i32,
    payload: AttachSizesRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    let txn = state.orm.begin().await?;
    let product = find_product(&txn, id).await?;
    attach_size_ids(&txn, id, &payload.size_ids).await?;
    let detail = load_detail(&txn, product).await?;
    txn.commit().await?;
    Ok(ApiResponse::success("Sizes attached", detail, Some(Meta::empty())))
}

pub async fn detach_color(
    state: &AppState,
    id: i32,
    color_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_product(&state.orm, id).await?;
    let result = ProductColors::delete_by_id((id, color_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Color is not attached to this product".into()));
    }
    Ok(ApiResponse::deleted("Color detached"))
}

pub async fn detach_size(
    state: &AppState,
    id: i32,
    size_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_product(&state.orm, id).await?;
    let result = ProductSizes::delete_by_id((id, size_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Size is not attached to this product".into()));
    }
    Ok(ApiResponse::deleted("Size detached"))
}

pub async fn find_product<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))
}

async fn load_detail<C: ConnectionTrait>(db: &C, product: ProductModel) -> AppResult<ProductDetail> {
    // A soft-deleted category is reported as no category.
    let category = match product.category_id {
        Some(category_id) => match category_service::find_live(db, category_id).await {
            Ok(c) => Some(CategorySummary {
                id: c.id,
                name: c.name,
                slug: c.slug,
            }),
            Err(AppError::NotFound(_)) => None,
            Err(err) => return Err(err),
        },
        None => None,
    };

    let colors = product
        .find_related(Colors)
        .filter(colors::Column::DeletedAt.is_null())
        .order_by_asc(colors::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    let sizes = product
        .find_related(Sizes)
        .filter(sizes::Column::DeletedAt.is_null())
        .order_by_asc(sizes::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();
    let images = ProductImages::find()
        .filter(product_images::Column::ProductId.eq(product.id))
        .order_by_asc(product_images::Column::DisplayOrder)
        .order_by_asc(product_images::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(ProductImage::from)
        .collect();

    Ok(ProductDetail {
        product: product.into(),
        category,
        colors,
        sizes,
        images,
    })
}

/// Links live colors to a product, skipping ids that are already linked.
async fn attach_color_ids<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    color_ids: &[i32],
) -> AppResult<()> {
    let attached: HashSet<i32> = ProductColors::find()
        .filter(product_colors::Column::ProductId.eq(product_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.color_id)
        .collect();

    let mut seen = HashSet::new();
    for &color_id in color_ids {
        if attached.contains(&color_id) || !seen.insert(color_id) {
            continue;
        }
        let color = Colors::find_by_id(color_id)
            .filter(colors::Column::DeletedAt.is_null())
            .one(db)
            .await?;
        if color.is_none() {
            return Err(AppError::NotFound(format!("Color {color_id} not found")));
        }
        ProductColors::insert(product_colors::ActiveModel {
            product_id: Set(product_id),
            color_id: Set(color_id),
        })
        .exec_without_returning(db)
        .await?;
    }
    Ok(())
}

async fn attach_size_ids<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    size_ids: &[i32],
) -> AppResult<()> {
    let attached: HashSet<i32> = ProductSizes::find()
        .filter(product_sizes::Column::ProductId.eq(product_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.size_id)
        .collect();

    let mut seen = HashSet::new();
    for &size_id in size_ids {
        if attached.contains(&size_id) || !seen.insert(size_id) {
            continue;
        }
        let size = Sizes::find_by_id(size_id)
            .filter(sizes::Column::DeletedAt.is_null())
            .one(db)
            .await?;
        if size.is_none() {
            return Err(AppError::NotFound(format!("Size {size_id} not found")));
        }
        ProductSizes::insert(product_sizes::ActiveModel {
            product_id: Set(product_id),
            size_id: Set(size_id),
        })
        .exec_without_returning(db)
        .await?;
    }
    Ok(())
}

async fn ensure_name_free<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<i32>,
) -> AppResult<()> {
    let mut condition = Condition::all().add(Column::Name.eq(name));
    if let Some(id) = except {
        condition = condition.add(Column::Id.ne(id));
    }
    if Products::find().filter(condition).one(db).await?.is_some() {
        return Err(AppError::Conflict(format!("Product '{name}' already exists")));
    }
    Ok(())
}
