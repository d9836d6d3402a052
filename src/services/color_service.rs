use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};

use crate::{
    dto::catalog::{ColorList, CreateColorRequest, UpdateColorRequest},
    entity::colors::{ActiveModel, Column, Entity as Colors, Model as ColorModel},
    error::{AppError, AppResult},
    models::Color,
    response::{ApiResponse, Meta},
    routes::params::{SearchQuery, search_term},
    state::AppState,
};

pub async fn list_colors(state: &AppState, query: SearchQuery) -> AppResult<ApiResponse<ColorList>> {
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();
    let mut condition = Condition::all().add(Column::DeletedAt.is_null());
    if let Some(pattern) = search_term(&query.q) {
        condition = condition.add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern));
    }

    let finder = Colors::find().filter(condition).order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Color::from)
        .collect();

    Ok(ApiResponse::success(
        "Colors",
        ColorList { items },
        Some(Meta::for_page(&pagination, total)),
    ))
}

pub async fn get_color(state: &AppState, id: i32) -> AppResult<ApiResponse<Color>> {
    let color = find_live(&state.orm, id).await?;
    Ok(ApiResponse::success("Color", color.into(), None))
}

pub async fn create_color(
    state: &AppState,
    payload: CreateColorRequest,
) -> AppResult<ApiResponse<Color>> {
    let name = payload.name.trim().to_string();
    ensure_name_free(&state.orm, &name, None).await?;

    let now = Utc::now();
    let color = ActiveModel {
        name: Set(name),
        code: Set(payload.code),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(color_id = color.id, "color created");
    Ok(ApiResponse::success(
        "Color created",
        color.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_color(
    state: &AppState,
    id: i32,
    payload: UpdateColorRequest,
) -> AppResult<ApiResponse<Color>> {
    let existing = find_live(&state.orm, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        ensure_name_free(&state.orm, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(code) = payload.code {
        active.code = Set(Some(code));
    }
    active.updated_at = Set(Utc::now());
    let color = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Updated", color.into(), Some(Meta::empty())))
}

pub async fn delete_color(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_live(&state.orm, id).await?;
    let mut active: ActiveModel = existing.into();
    active.deleted_at = Set(Some(Utc::now()));
    active.update(&state.orm).await?;

    tracing::info!(color_id = id, "color deleted");
    Ok(ApiResponse::deleted("Deleted"))
}

pub async fn find_live<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<ColorModel> {
    Colors::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Color"))
}

/// Resolves a color display name (as sent by the storefront cart) to its row.
pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<ColorModel> {
    Colors::find()
        .filter(Column::Name.eq(name.trim()))
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Color '{name}' not found")))
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
    if Colors::find().filter(condition).one(db).await?.is_some() {
        return Err(AppError::Conflict(format!("Color '{name}' already exists")));
    }
    Ok(())
}
