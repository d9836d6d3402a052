use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::catalog::{CreateColorRequest, ColorList, UpdateColorRequest},
    error::AppResult,
    middleware::{
        auth::AdminPrincipal,
        extract::{Path, Query},
        validate::ValidatedJson,
    },
    models::Color,
    response::ApiResponse,
    routes::params::SearchQuery,
    services::color_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_colors).post(create_color))
        .route(
            "/{id}",
            get(get_color).put(update_color).delete(delete_color),
        )
}

#[utoipa::path(
    get,
    path = "/api/colors",
    params(SearchQuery),
    responses(
        (status = 200, description = "List colors", body = ApiResponse<ColorList>)
    ),
    tag = "Colors"
)]
pub async fn list_colors(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ColorList>>> {
    let resp = color_service::list_colors(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/colors/{id}",
    params(("id" = i32, Path, description = "Color ID")),
    responses(
        (status = 200, description = "Color by id", body = ApiResponse<Color>),
        (status = 404, description = "Color not found"),
    ),
    tag = "Colors"
)]
pub async fn get_color(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Color>>> {
    let resp = color_service::get_color(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/colors",
    request_body = CreateColorRequest,
    responses(
        (status = 201, description = "Color created", body = ApiResponse<Color>),
        (status = 409, description = "Name already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Colors"
)]
pub async fn create_color(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    ValidatedJson(payload): ValidatedJson<CreateColorRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Color>>)> {
    let resp = color_service::create_color(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/colors/{id}",
    params(("id" = i32, Path, description = "Color ID")),
    request_body = UpdateColorRequest,
    responses(
        (status = 200, description = "Color updated", body = ApiResponse<Color>),
        (status = 404, description = "Color not found"),
        (status = 409, description = "Name already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Colors"
)]
pub async fn update_color(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateColorRequest>,
) -> AppResult<Json<ApiResponse<Color>>> {
    let resp = color_service::update_color(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/colors/{id}",
    params(("id" = i32, Path, description = "Color ID")),
    responses(
        (status = 200, description = "Color soft-deleted"),
        (status = 404, description = "Color not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Colors"
)]
pub async fn delete_color(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = color_service::delete_color(&state, id).await?;
    Ok(Json(resp))
}
