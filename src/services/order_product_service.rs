use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    dto::{
        order_products::{CreateOrderProductRequest, OrderProductList, UpdateOrderProductRequest},
        orders::CartLine,
    },
    entity::order_products::{ActiveModel, Column, Entity as OrderProducts, Model as LineModel},
    error::{AppError, AppResult},
    models::OrderProduct,
    response::{ApiResponse, Meta},
    routes::params::OrderProductQuery,
    services::order_service::{self, line_amount},
    state::AppState,
};

pub async fn list_order_products(
    state: &AppState,
    query: OrderProductQuery,
) -> AppResult<ApiResponse<OrderProductList>> {
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();
    if let Some(order_id) = query.order_id {
        condition = condition.add(Column::OrderId.eq(order_id));
    }

    let finder = OrderProducts::find().filter(condition).order_by_asc(Column::Id);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderProduct::from)
        .collect();

    Ok(ApiResponse::success(
        "Order products",
        OrderProductList { items },
        Some(Meta::for_page(&pagination, total)),
    ))
}

pub async fn get_order_product(state: &AppState, id: i32) -> AppResult<ApiResponse<OrderProduct>> {
    let item = find_line(&state.orm, id).await?;
    Ok(ApiResponse::success("Order product", item.into(), None))
}

pub async fn create_order_product(
    state: &AppState,
    payload: CreateOrderProductRequest,
) -> AppResult<ApiResponse<OrderProduct>> {
    let txn = state.orm.begin().await?;
    order_service::find_order(&txn, payload.order_id).await?;

    let line = CartLine {
        product_id: payload.product_id,
        quantity: payload.quantity,
        price: payload.price,
        color: payload.color,
        size: payload.size,
    };
    let item = order_service::insert_line(&txn, payload.order_id, &line).await?;
    order_service::adjust_total(&txn, item.order_id, line_amount(item.price, item.quantity))
        .await?;
    txn.commit().await?;

    tracing::info!(order_product_id = item.id, order_id = item.order_id, "order product created");
    Ok(ApiResponse::success(
        "Order product created",
        item.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_order_product(
    state: &AppState,
    id: i32,
    payload: UpdateOrderProductRequest,
) -> AppResult<ApiResponse<OrderProduct>> {
    let txn = state.orm.begin().await?;
    let existing = find_line(&txn, id).await?;
    let before = line_amount(existing.price, existing.quantity);
    let (color_id, size_id) = order_service::resolve_variant(
        &txn,
        payload.color.as_deref(),
        payload.size.as_deref(),
    )
    .await?;

    let mut active: ActiveModel = existing.into();
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if color_id.is_some() {
        active.color_id = Set(color_id);
    }
    if size_id.is_some() {
        active.size_id = Set(size_id);
    }
    let item = active.update(&txn).await?;

    let after = line_amount(item.price, item.quantity);
    order_service::adjust_total(&txn, item.order_id, after - before).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Updated", item.into(), Some(Meta::empty())))
}

pub async fn delete_order_product(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let item = find_line(&txn, id).await?;
    OrderProducts::delete_by_id(id).exec(&txn).await?;
    order_service::adjust_total(&txn, item.order_id, -line_amount(item.price, item.quantity))
        .await?;
    txn.commit().await?;

    tracing::info!(order_product_id = id, order_id = item.order_id, "order product deleted");
    Ok(ApiResponse::deleted("Deleted"))
}

async fn find_line<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<LineModel> {
    OrderProducts::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Order product"))
}
