mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{JWT_SECRET, create_admin, create_user, setup_state};
use fashion_store_api::{
    app::build_app,
    middleware::auth::{Principal, issue_token},
    services::{admin_service, user_service},
};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    Ok(builder.body(Body::from(body.to_string()))?)
}

fn get(uri: &str, token: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    Ok(builder.body(Body::empty())?)
}

fn token_for(principal: Principal) -> anyhow::Result<String> {
    Ok(issue_token(principal, JWT_SECRET, 1)?.0)
}

#[tokio::test]
async fn health_and_fallback() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let app = build_app(state);

    let (status, body) = send(&app, get("/health", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = send(&app, get("/nowhere", None)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], "No route for /nowhere");
    Ok(())
}

#[tokio::test]
async fn writes_require_an_admin_token() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let customer = create_user(&state, "amina@example.com").await?;
    let admin = create_admin(&state, "root@example.com").await?;
    let app = build_app(state);
    let payload = json!({ "name": "Robes" });

    let (status, body) = send(&app, json_request("POST", "/api/categories", None, payload.clone())?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let user_token = token_for(customer)?;
    let (status, _) = send(
        &app,
        json_request("POST", "/api/categories", Some(&user_token), payload.clone())?,
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = token_for(admin)?;
    let (status, body) = send(
        &app,
        json_request("POST", "/api/categories", Some(&admin_token), payload.clone())?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "robes");

    // the same routes answer without the /api prefix
    let (status, body) = send(
        &app,
        json_request("POST", "/categories", Some(&admin_token), payload)?,
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    let (status, body) = send(&app, get("/categories", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["meta"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn errors_use_the_status_message_shape() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let admin = create_admin(&state, "root@example.com").await?;
    let app = build_app(state);

    let (status, body) = send(&app, get("/api/size/999", None)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], "Size not found");

    let token = token_for(admin)?;
    let (status, body) = send(
        &app,
        json_request("POST", "/api/colors", Some(&token), json!({ "name": "" }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = send(&app, get("/api/products/abc", None)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = send(&app, get("/api/products?page=x", None)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = send(&app, get("/api/products?page=18446744073709551615&per_page=100", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn tokens_of_deleted_accounts_are_refused() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let root = create_admin(&state, "root@example.com").await?;
    let removed = create_admin(&state, "gone@example.com").await?;
    let customer = create_user(&state, "amina@example.com").await?;
    let removed_token = token_for(removed)?;
    let customer_token = token_for(customer)?;

    admin_service::delete_admin(&state, removed.id).await?;
    user_service::delete_user(&state, customer.id).await?;
    let app = build_app(state);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/categories", Some(&removed_token), json!({ "name": "Robes" }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let (status, _) = send(&app, get("/api/orders/mine", Some(&customer_token))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let root_token = token_for(root)?;
    let (status, _) = send(
        &app,
        json_request("POST", "/api/categories", Some(&root_token), json!({ "name": "Robes" }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn register_login_and_checkout_over_http() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let admin = create_admin(&state, "root@example.com").await?;
    let app = build_app(state);
    let admin_token = token_for(admin)?;

    let (status, product) = send(
        &app,
        json_request(
            "POST",
            "/api/products",
            Some(&admin_token),
            json!({ "name": "Robe A", "price": 199.99, "stock": 5 }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["data"]["id"].as_i64().unwrap_or_default();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "first_name": "Sara",
                "last_name": "Idrissi",
                "email": "sara@example.com",
                "password": "motdepasse"
            }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "sara@example.com", "password": "motdepasse" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let token = login["data"]["token"].as_str().unwrap_or_default().to_string();

    let (status, placed) = send(
        &app,
        json_request(
            "POST",
            "/api/orders/checkout",
            Some(&token),
            json!({
                "contact": {
                    "first_name": "Sara",
                    "last_name": "Idrissi",
                    "phone": "0700000000",
                    "city": "Fès",
                    "address": "3 Derb Lihoudi"
                },
                "products": [{ "product_id": product_id, "quantity": 2, "price": 199.99 }]
            }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["data"]["order"]["status"], "new");
    let order_id = placed["data"]["order"]["id"].as_i64().unwrap_or_default();

    let (status, fetched) = send(&app, get(&format!("/api/orders/{order_id}"), Some(&token))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["items"][0]["price"], 199.99);
    assert_eq!(fetched["data"]["items"][0]["product_name"], "Robe A");

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/orders/{order_id}"),
            Some(&admin_token),
            json!({ "status": "shipped" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, mine) = send(&app, get("/api/orders/mine?status=shipped", Some(&token))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["meta"]["total"], 1);

    // an empty cart never reaches the service
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/orders/checkout",
            Some(&token),
            json!({
                "contact": {
                    "first_name": "Sara",
                    "last_name": "Idrissi",
                    "phone": "0700000000",
                    "city": "Fès",
                    "address": "3 Derb Lihoudi"
                },
                "products": []
            }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn multipart_upload_sets_primary_image() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let admin = create_admin(&state, "root@example.com").await?;
    let product_id = common::create_product(&state, "Robe A", 199.99, None).await?;
    let app = build_app(state);
    let token = token_for(admin)?;

    let boundary = "XBOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"robe.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0x89, b'P', b'N', b'G']);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/productImages/products/{product_id}/images"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))?;
    let (status, uploaded) = send(&app, request).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(uploaded["data"]["is_primary"], true);

    let url = uploaded["data"]["url"].as_str().unwrap_or_default().to_string();
    let response = app.clone().oneshot(get(&url, None)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
