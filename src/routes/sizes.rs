use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::catalog::{CreateSizeRequest, SizeList, UpdateSizeRequest},
    error::AppResult,
    middleware::{
        auth::AdminPrincipal,
        extract::{Path, Query},
        validate::ValidatedJson,
    },
    models::Size,
    response::ApiResponse,
    routes::params::SearchQuery,
    services::size_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sizes).post(create_size))
        .route(
            "/{id}",
            get(get_size).put(update_size).delete(delete_size),
        )
}

#[utoipa::path(
    get,
    path = "/api/size",
    params(SearchQuery),
    responses(
        (status = 200, description = "List sizes", body = ApiResponse<SizeList>)
    ),
    tag = "Sizes"
)]
pub async fn list_sizes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<SizeList>>> {
    let resp = size_service::list_sizes(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/size/{id}",
    params(("id" = i32, Path, description = "Size ID")),
    responses(
        (status = 200, description = "Size by id", body = ApiResponse<Size>),
        (status = 404, description = "Size not found"),
    ),
    tag = "Sizes"
)]
pub async fn get_size(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Size>>> {
    let resp = size_service::get_size(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/size",
    request_body = CreateSizeRequest,
    responses(
        (status = 201, description = "Size created", body = ApiResponse<Size>),
        (status = 409, description = "Name already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sizes"
)]
pub async fn create_size(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    ValidatedJson(payload): ValidatedJson<CreateSizeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Size>>)> {
    let resp = size_service::create_size(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/size/{id}",
    params(("id" = i32, Path, description = "Size ID")),
    request_body = UpdateSizeRequest,
    responses(
        (status = 200, description = "Size updated", body = ApiResponse<Size>),
        (status = 404, description = "Size not found"),
        (status = 409, description = "Name already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sizes"
)]
pub async fn update_size(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateSizeRequest>,
) -> AppResult<Json<ApiResponse<Size>>> {
    let resp = size_service::update_size(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/size/{id}",
    params(("id" = i32, Path, description = "Size ID")),
    responses(
        (status = 200, description = "Size soft-deleted"),
        (status = 404, description = "Size not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sizes"
)]
pub async fn delete_size(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = size_service::delete_size(&state, id).await?;
    Ok(Json(resp))
}
