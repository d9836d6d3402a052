mod common;

use axum::extract::State;
use fashion_store_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let (state, _uploads) = common::setup_state().await?;
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");
    assert!(response.0.data.is_some());
    Ok(())
}
