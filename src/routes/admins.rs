use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::users::{CreateAdminRequest, AdminList, UpdateAdminRequest},
    error::AppResult,
    middleware::{
        auth::AdminPrincipal,
        extract::{Path, Query},
        validate::ValidatedJson,
    },
    models::Admin,
    response::ApiResponse,
    routes::params::SearchQuery,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admins).post(create_admin))
        .route(
            "/{id}",
            get(get_admin).put(update_admin).delete(delete_admin),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin",
    params(SearchQuery),
    responses(
        (status = 200, description = "List admins", body = ApiResponse<AdminList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn list_admins(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<AdminList>>> {
    let resp = admin_service::list_admins(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/{id}",
    params(("id" = i32, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin by id", body = ApiResponse<Admin>),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn get_admin(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Admin>>> {
    let resp = admin_service::get_admin(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = ApiResponse<Admin>),
        (status = 409, description = "Email already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn create_admin(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    ValidatedJson(payload): ValidatedJson<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Admin>>)> {
    let resp = admin_service::create_admin(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/{id}",
    params(("id" = i32, Path, description = "Admin ID")),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Admin updated", body = ApiResponse<Admin>),
        (status = 404, description = "Admin not found"),
        (status = 409, description = "Email already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn update_admin(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateAdminRequest>,
) -> AppResult<Json<ApiResponse<Admin>>> {
    let resp = admin_service::update_admin(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/{id}",
    params(("id" = i32, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin soft-deleted"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_admin(&state, id).await?;
    Ok(Json(resp))
}
