use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};

use crate::{
    dto::catalog::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    entity::categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    models::{Category, slugify},
    response::{ApiResponse, Meta},
    routes::params::{SearchQuery, search_term},
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();
    let mut condition = Condition::all().add(Column::DeletedAt.is_null());
    if let Some(pattern) = search_term(&query.q) {
        condition = condition.add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern));
    }

    let finder = Categories::find()
        .filter(condition)
        .order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::for_page(&pagination, total)),
    ))
}

pub async fn get_category(state: &AppState, id: i32) -> AppResult<ApiResponse<Category>> {
    let category = find_live(&state.orm, id).await?;
    Ok(ApiResponse::success("Category", category.into(), None))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let name = payload.name.trim().to_string();
    ensure_name_free(&state.orm, &name, None).await?;

    let now = Utc::now();
    let category = ActiveModel {
        slug: Set(slugify(&name)),
        name: Set(name),
        description: Set(payload.description),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(category_id = category.id, "category created");
    Ok(ApiResponse::success(
        "Category created",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    id: i32,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let existing = find_live(&state.orm, id).await?;

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
    active.updated_at = Set(Utc::now());
    let category = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_live(&state.orm, id).await?;
    let mut active: ActiveModel = existing.into();
    active.deleted_at = Set(Some(Utc::now()));
    active.update(&state.orm).await?;

    tracing::info!(category_id = id, "category deleted");
    Ok(ApiResponse::deleted("Deleted"))
}

/// Category by id, ignoring soft-deleted rows.
pub async fn find_live<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<CategoryModel> {
    Categories::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))
}

async fn ensure_name_free<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<i32>,
) -> AppResult<()> {
    let mut condition = Condition::all()
        .add(Column::Name.eq(name))
        .add(Column::DeletedAt.is_null());
    if let Some(id) = except {
        condition = condition.add(Column::Id.ne(id));
    }
    if Categories::find().filter(condition).one(db).await?.is_some() {
        return Err(AppError::Conflict(format!("Category '{name}' already exists")));
    }
    Ok(())
}
