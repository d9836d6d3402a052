use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        AddOrderProductsRequest, CartLine, CheckoutRequest, OrderContact, OrderLine, OrderList,
        OrderWithItems, UpdateOrderStatusRequest,
    },
    entity::{
        Colors, Products, Sizes, colors,
        order_products::{
            ActiveModel as LineActive, Column as LineCol, Entity as OrderProducts,
            Model as LineModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products, sizes,
    },
    error::{AppError, AppResult},
    middleware::auth::Principal,
    models::{Order, OrderProduct, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{color_service, size_service, user_service},
    state::AppState,
};

/// Places an order and all of its line-items in one transaction.
///
/// Either the order and every line exist afterwards or nothing was written.
pub async fn checkout(
    state: &AppState,
    principal: &Principal,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let user_id = principal.customer_id()?;
    user_service::find_live(&state.orm, user_id).await?;

    let txn = state.orm.begin().await?;
    let order = insert_order(&txn, user_id, payload.contact).await?;
    let order = insert_lines(&txn, order, &payload.products).await?;
    let data = load_with_items(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = data.order.id,
        reference = %data.order.reference,
        lines = data.items.len(),
        "checkout completed"
    );
    Ok(ApiResponse::success(
        "Checkout success",
        data,
        Some(Meta::empty()),
    ))
}

/// Creates an order without line-items; they are attached with [`add_order_products`].
pub async fn create_order(
    state: &AppState,
    principal: &Principal,
    contact: OrderContact,
) -> AppResult<ApiResponse<Order>> {
    let user_id = principal.customer_id()?;
    user_service::find_live(&state.orm, user_id).await?;

    let txn = state.orm.begin().await?;
    let order = insert_order(&txn, user_id, contact).await?;
    txn.commit().await?;

    tracing::info!(order_id = order.id, reference = %order.reference, "order created");
    Ok(ApiResponse::success(
        "Order created",
        order.into(),
        Some(Meta::empty()),
    ))
}

pub async fn add_order_products(
    state: &AppState,
    principal: &Principal,
    order_id: i32,
    payload: AddOrderProductsRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;
    let order = find_visible(&txn, principal, order_id).await?;
    let order = insert_lines(&txn, order, &payload.products).await?;
    let data = load_with_items(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(order_id, lines = payload.products.len(), "order lines added");
    Ok(ApiResponse::success(
        "Products added to order",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    query_orders(state, None, query).await
}

pub async fn list_my_orders(
    state: &AppState,
    principal: &Principal,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let user_id = principal.customer_id()?;
    query_orders(state, Some(user_id), query).await
}

pub async fn get_order(
    state: &AppState,
    principal: &Principal,
    id: i32,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_visible(&state.orm, principal, id).await?;
    let data = load_with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Any status may be set from any other; there is no enforced lifecycle.
pub async fn update_order_status(
    state: &AppState,
    id: i32,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let existing = find_order(&state.orm, id).await?;
    let previous = existing.status;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = id, from = ?previous, to = ?order.status, "order status updated");
    Ok(ApiResponse::success(
        "Order status updated",
        order.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let order = find_order(&txn, id).await?;
    OrderProducts::delete_many()
        .filter(LineCol::OrderId.eq(id))
        .exec(&txn)
        .await?;
    order.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = id, "order deleted");
    Ok(ApiResponse::deleted("Deleted"))
}

async fn query_orders(
    state: &AppState,
    user_id: Option<i32>,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();

    let mut condition = Condition::all();
    if let Some(user_id) = user_id {
        condition = condition.add(OrderCol::UserId.eq(user_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt).order_by_asc(OrderCol::Id),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt).order_by_desc(OrderCol::Id),
    };

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::for_page(&pagination, total)),
    ))
}

async fn insert_order(
    txn: &DatabaseTransaction,
    user_id: i32,
    contact: OrderContact,
) -> AppResult<OrderModel> {
    let reference = build_reference(Uuid::new_v4());
    if Orders::find()
        .filter(OrderCol::Reference.eq(reference.clone()))
        .one(txn)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Order reference {reference} already exists"
        )));
    }

    let now = Utc::now();
    let order = OrderActive {
        reference: Set(reference),
        user_id: Set(user_id),
        first_name: Set(contact.first_name),
        last_name: Set(contact.last_name),
        phone: Set(contact.phone),
        city: Set(contact.city),
        address: Set(contact.address),
        total: Set(0.0),
        status: Set(OrderStatus::New),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    Ok(order)
}

/// Appends cart lines to `order` and adds their amount to its total.
async fn insert_lines(
    txn: &DatabaseTransaction,
    order: OrderModel,
    lines: &[CartLine],
) -> AppResult<OrderModel> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("Order must contain at least one product".into()));
    }

    let mut added = 0.0;
    for line in lines {
        let item = insert_line(txn, order.id, line).await?;
        added += line_amount(item.price, item.quantity);
    }

    let total = round_money(order.total + added);
    let mut active: OrderActive = order.into();
    active.total = Set(total);
    active.updated_at = Set(Utc::now());
    Ok(active.update(txn).await?)
}

/// Inserts one line-item after resolving its color/size names.
///
/// A product may appear only once per order; a repeat is a conflict.
pub async fn insert_line<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    line: &CartLine,
) -> AppResult<LineModel> {
    if Products::find_by_id(line.product_id).one(db).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Product {} not found",
            line.product_id
        )));
    }

    let duplicate = OrderProducts::find()
        .filter(LineCol::OrderId.eq(order_id))
        .filter(LineCol::ProductId.eq(line.product_id))
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "Product {} is already part of this order",
            line.product_id
        )));
    }

    let (color_id, size_id) = resolve_variant(db, line.color.as_deref(), line.size.as_deref()).await?;

    let item = LineActive {
        order_id: Set(order_id),
        product_id: Set(line.product_id),
        quantity: Set(line.quantity),
        price: Set(line.price),
        color_id: Set(color_id),
        size_id: Set(size_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(item)
}

/// Resolves the optional color and size display names to their ids.
pub async fn resolve_variant<C: ConnectionTrait>(
    db: &C,
    color: Option<&str>,
    size: Option<&str>,
) -> AppResult<(Option<i32>, Option<i32>)> {
    let color_id = match color.map(str::trim).filter(|c| !c.is_empty()) {
        Some(name) => Some(color_service::find_by_name(db, name).await?.id),
        None => None,
    };
    let size_id = match size.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => Some(size_service::find_by_name(db, name).await?.id),
        None => None,
    };
    Ok((color_id, size_id))
}

/// Adds `delta` to the stored total of `order_id`.
pub async fn adjust_total<C: ConnectionTrait>(db: &C, order_id: i32, delta: f64) -> AppResult<()> {
    let order = find_order(db, order_id).await?;
    let total = round_money(order.total + delta).max(0.0);
    Orders::update_many()
        .col_expr(OrderCol::Total, Expr::value(total))
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(OrderCol::Id.eq(order_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn find_order<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))
}

/// Order by id as seen by `principal`: admins see every order, customers their own.
async fn find_visible<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    id: i32,
) -> AppResult<OrderModel> {
    let order = find_order(db, id).await?;
    if !principal.is_admin() && order.user_id != principal.id {
        return Err(AppError::not_found("Order"));
    }
    Ok(order)
}

pub async fn load_with_items<C: ConnectionTrait>(
    db: &C,
    order: OrderModel,
) -> AppResult<OrderWithItems> {
    let items = OrderProducts::find()
        .filter(LineCol::OrderId.eq(order.id))
        .order_by_asc(LineCol::Id)
        .all(db)
        .await?;

    let product_names: HashMap<i32, String> = Products::find()
        .filter(products::Column::Id.is_in(items.iter().map(|i| i.product_id)))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    // Historical lines keep their names even after a color or size is soft-deleted.
    let color_names: HashMap<i32, String> = Colors::find()
        .filter(colors::Column::Id.is_in(items.iter().filter_map(|i| i.color_id)))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let size_names: HashMap<i32, String> = Sizes::find()
        .filter(sizes::Column::Id.is_in(items.iter().filter_map(|i| i.size_id)))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    let items = items
        .into_iter()
        .map(|item| OrderLine {
            product_name: product_names
                .get(&item.product_id)
                .cloned()
                .unwrap_or_default(),
            color: item.color_id.and_then(|id| color_names.get(&id).cloned()),
            size: item.size_id.and_then(|id| size_names.get(&id).cloned()),
            item: OrderProduct::from(item),
        })
        .collect();

    Ok(OrderWithItems {
        order: order.into(),
        items,
    })
}

pub fn line_amount(price: f64, quantity: i32) -> f64 {
    price * f64::from(quantity)
}

pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn build_reference(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    format!("ORD-{}-{}", date, suffix[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_has_date_and_short_suffix() {
        let id = Uuid::parse_str("3f2a9c10-0000-4000-8000-000000000000").unwrap();
        let reference = build_reference(id);
        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2], "3F2A9C10");
    }

    #[test]
    fn totals_are_rounded_to_cents() {
        assert_eq!(round_money(line_amount(199.99, 3)), 599.97);
        assert_eq!(round_money(0.1 + 0.2), 0.3);
    }
}
