use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::order_products::{
        CreateOrderProductRequest, OrderProductList, UpdateOrderProductRequest,
    },
    error::AppResult,
    middleware::{
        auth::AdminPrincipal,
        extract::{Path, Query},
        validate::ValidatedJson,
    },
    models::OrderProduct,
    response::ApiResponse,
    routes::params::OrderProductQuery,
    services::order_product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_order_products).post(create_order_product))
        .route(
            "/{id}",
            get(get_order_product)
                .put(update_order_product)
                .delete(delete_order_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/orderProducts",
    params(OrderProductQuery),
    responses(
        (status = 200, description = "Order line-items", body = ApiResponse<OrderProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Order Products"
)]
pub async fn list_order_products(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Query(query): Query<OrderProductQuery>,
) -> AppResult<Json<ApiResponse<OrderProductList>>> {
    let resp = order_product_service::list_order_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orderProducts/{id}",
    params(("id" = i32, Path, description = "Line-item ID")),
    responses(
        (status = 200, description = "Order line-item", body = ApiResponse<OrderProduct>),
        (status = 404, description = "Line-item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Order Products"
)]
pub async fn get_order_product(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<OrderProduct>>> {
    let resp = order_product_service::get_order_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orderProducts",
    request_body = CreateOrderProductRequest,
    responses(
        (status = 201, description = "Line-item created", body = ApiResponse<OrderProduct>),
        (status = 404, description = "Order, product, color or size not found"),
        (status = 409, description = "Product already on the order"),
    ),
    security(("bearer_auth" = [])),
    tag = "Order Products"
)]
pub async fn create_order_product(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    ValidatedJson(payload): ValidatedJson<CreateOrderProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderProduct>>)> {
    let resp = order_product_service::create_order_product(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/orderProducts/{id}",
    params(("id" = i32, Path, description = "Line-item ID")),
    request_body = UpdateOrderProductRequest,
    responses(
        (status = 200, description = "Line-item updated", body = ApiResponse<OrderProduct>),
        (status = 404, description = "Line-item, color or size not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Order Products"
)]
pub async fn update_order_product(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderProductRequest>,
) -> AppResult<Json<ApiResponse<OrderProduct>>> {
    let resp = order_product_service::update_order_product(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orderProducts/{id}",
    params(("id" = i32, Path, description = "Line-item ID")),
    responses(
        (status = 200, description = "Line-item deleted"),
        (status = 404, description = "Line-item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Order Products"
)]
pub async fn delete_order_product(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_product_service::delete_order_product(&state, id).await?;
    Ok(Json(resp))
}
