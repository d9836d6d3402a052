use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};

use crate::{
    dto::users::{AdminList, CreateAdminRequest, UpdateAdminRequest},
    entity::admins::{ActiveModel, Column, Entity as Admins, Model as AdminModel},
    error::{AppError, AppResult},
    models::Admin,
    response::{ApiResponse, Meta},
    routes::params::{SearchQuery, search_term},
    services::{auth_service::hash_password, user_service::normalize_email},
    state::AppState,
};

pub async fn list_admins(state: &AppState, query: SearchQuery) -> AppResult<ApiResponse<AdminList>> {
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();
    let mut condition = Condition::all().add(Column::DeletedAt.is_null());
    if let Some(pattern) = search_term(&query.q) {
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(Column::Email))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern)),
        );
    }

    let finder = Admins::find().filter(condition).order_by_asc(Column::Id);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Admin::from)
        .collect();

    Ok(ApiResponse::success(
        "Admins",
        AdminList { items },
        Some(Meta::for_page(&pagination, total)),
    ))
}

pub async fn get_admin(state: &AppState, id: i32) -> AppResult<ApiResponse<Admin>> {
    let admin = find_live(&state.orm, id).await?;
    Ok(ApiResponse::success("Admin", admin.into(), None))
}

pub async fn create_admin(
    state: &AppState,
    payload: CreateAdminRequest,
) -> AppResult<ApiResponse<Admin>> {
    let email = normalize_email(&payload.email);
    ensure_email_free(&state.orm, &email, None).await?;

    let now = Utc::now();
    let admin = ActiveModel {
        name: Set(payload.name),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(admin_id = admin.id, "admin created");
    Ok(ApiResponse::success(
        "Admin created",
        admin.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_admin(
    state: &AppState,
    id: i32,
    payload: UpdateAdminRequest,
) -> AppResult<ApiResponse<Admin>> {
    let existing = find_live(&state.orm, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(email) = payload.email {
        let email = normalize_email(&email);
        ensure_email_free(&state.orm, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(hash_password(&password)?);
    }
    active.updated_at = Set(Utc::now());
    let admin = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Updated", admin.into(), Some(Meta::empty())))
}

pub async fn delete_admin(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_live(&state.orm, id).await?;
    let mut active: ActiveModel = existing.into();
    active.deleted_at = Set(Some(Utc::now()));
    active.update(&state.orm).await?;

    tracing::info!(admin_id = id, "admin deleted");
    Ok(ApiResponse::deleted("Deleted"))
}

pub async fn find_live<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<AdminModel> {
    Admins::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Admin"))
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> AppResult<Option<AdminModel>> {
    Ok(Admins::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?)
}

async fn ensure_email_free<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except: Option<i32>,
) -> AppResult<()> {
    let mut condition = Condition::all()
        .add(Column::Email.eq(email))
        .add(Column::DeletedAt.is_null());
    if let Some(id) = except {
        condition = condition.add(Column::Id.ne(id));
    }
    if Admins::find().filter(condition).one(db).await?.is_some() {
        return Err(AppError::Conflict("Email is already taken".into()));
    }
    Ok(())
}
