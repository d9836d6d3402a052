use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};

use crate::{
    dto::catalog::{CreateSizeRequest, SizeList, UpdateSizeRequest},
    entity::sizes::{ActiveModel, Column, Entity as Sizes, Model as SizeModel},
    error::{AppError, AppResult},
    models::Size,
    response::{ApiResponse, Meta},
    routes::params::{SearchQuery, search_term},
    state::AppState,
};

pub async fn list_sizes(state: &AppState, query: SearchQuery) -> AppResult<ApiResponse<SizeList>> {
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();
    let mut condition = Condition::all().add(Column::DeletedAt.is_null());
    if let Some(pattern) = search_term(&query.q) {
        condition = condition.add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern));
    }

    let finder = Sizes::find().filter(condition).order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Size::from)
        .collect();

    Ok(ApiResponse::success(
        "Sizes",
        SizeList { items },
        Some(Meta::for_page(&pagination, total)),
    ))
}

pub async fn get_size(state: &AppState, id: i32) -> AppResult<ApiResponse<Size>> {
    let size = find_live(&state.orm, id).await?;
    Ok(ApiResponse::success("Size", size.into(), None))
}

pub async fn create_size(
    state: &AppState,
    payload: CreateSizeRequest,
) -> AppResult<ApiResponse<Size>> {
    let name = payload.name.trim().to_string();
    ensure_name_free(&state.orm, &name, None).await?;

    let now = Utc::now();
    let size = ActiveModel {
        name: Set(name),
        description: Set(payload.description),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(size_id = size.id, "size created");
    Ok(ApiResponse::success(
        "Size created",
        size.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_size(
    state: &AppState,
    id: i32,
    payload: UpdateSizeRequest,
) -> AppResult<ApiResponse<Size>> {
    let existing = find_live(&state.orm, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        ensure_name_free(&state.orm, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    active.updated_at = Set(Utc::now());
    let size = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Updated", size.into(), Some(Meta::empty())))
}

pub async fn delete_size(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_live(&state.orm, id).await?;
    let mut active: ActiveModel = existing.into();
    active.deleted_at = Set(Some(Utc::now()));
    active.update(&state.orm).await?;

    tracing::info!(size_id = id, "size deleted");
    Ok(ApiResponse::deleted("Deleted"))
}

pub async fn find_live<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<SizeModel> {
    Sizes::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Size"))
}

/// Resolves a size display name (as sent by the storefront cart) to its row.
pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<SizeModel> {
    Sizes::find()
        .filter(Column::Name.eq(name.trim()))
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Size '{name}' not found")))
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
    if Sizes::find().filter(condition).one(db).await?.is_some() {
        return Err(AppError::Conflict(format!("Size '{name}' already exists")));
    }
    Ok(())
}
