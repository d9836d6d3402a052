use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::{SearchQuery, search_term},
    services::auth_service::hash_password,
    state::AppState,
};

pub async fn list_users(state: &AppState, query: SearchQuery) -> AppResult<ApiResponse<UserList>> {
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();
    let mut condition = Condition::all().add(Column::DeletedAt.is_null());
    if let Some(pattern) = search_term(&query.q) {
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(Column::Email))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(Column::FirstName))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(Column::LastName))).like(pattern)),
        );
    }

    let finder = Users::find().filter(condition).order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::for_page(&pagination, total)),
    ))
}

pub async fn get_user(state: &AppState, id: i32) -> AppResult<ApiResponse<User>> {
    let user = find_live(&state.orm, id).await?;
    Ok(ApiResponse::success("User", user.into(), None))
}

pub async fn create_user(
    state: &AppState,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let email = normalize_email(&payload.email);
    ensure_email_free(&state.orm, &email, None).await?;

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now();
    let user = ActiveModel {
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        email: Set(email),
        password_hash: Set(password_hash),
        phone: Set(payload.phone),
        city: Set(payload.city),
        address: Set(payload.address),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = user.id, "user created");
    Ok(ApiResponse::success("User created", user.into(), None))
}

pub async fn update_user(
    state: &AppState,
    id: i32,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = find_live(&state.orm, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(email) = payload.email {
        let email = normalize_email(&email);
        ensure_email_free(&state.orm, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(city) = payload.city {
        active.city = Set(Some(city));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    active.updated_at = Set(Utc::now());
    let user = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Updated", user.into(), Some(Meta::empty())))
}

pub async fn delete_user(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_live(&state.orm, id).await?;
    let mut active: ActiveModel = existing.into();
    active.deleted_at = Set(Some(Utc::now()));
    active.update(&state.orm).await?;

    tracing::info!(user_id = id, "user deleted");
    Ok(ApiResponse::deleted("Deleted"))
}

pub async fn find_live<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<Option<UserModel>> {
    Ok(Users::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
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
    if Users::find().filter(condition).one(db).await?.is_some() {
        return Err(AppError::Conflict("Email is already taken".into()));
    }
    Ok(())
}
