mod common;

use common::{JWT_SECRET, create_admin, setup_state};
use fashion_store_api::{
    dto::auth::{LoginRequest, Profile, RegisterRequest},
    error::AppError,
    middleware::auth::{Role, verify_token},
    services::auth_service,
};

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Sara".into(),
        last_name: "Idrissi".into(),
        email: email.into(),
        password: "motdepasse".into(),
        phone: Some("0700000000".into()),
        city: Some("Fès".into()),
        address: None,
    }
}

#[tokio::test]
async fn register_login_and_profile() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let user = auth_service::register_user(&state, register_request("sara@example.com"))
        .await?
        .data
        .unwrap();
    assert_eq!(user.email, "sara@example.com");

    let login = auth_service::login(
        &state,
        LoginRequest {
            email: "sara@example.com".into(),
            password: "motdepasse".into(),
            admin: false,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(login.role, Role::User);

    let principal = verify_token(&login.token, JWT_SECRET)?;
    assert_eq!(principal.id, user.id);

    match auth_service::profile(&state, principal).await?.data.unwrap() {
        Profile::User(profile) => assert_eq!(profile.id, user.id),
        Profile::Admin(_) => panic!("expected a user profile"),
    }
    Ok(())
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    auth_service::register_user(&state, register_request("sara@example.com")).await?;

    let wrong_password = auth_service::login(
        &state,
        LoginRequest {
            email: "sara@example.com".into(),
            password: "nope".into(),
            admin: false,
        },
    )
    .await;
    assert!(matches!(wrong_password, Err(AppError::Unauthorized(_))));

    // a customer account is not an admin account
    let wrong_table = auth_service::login(
        &state,
        LoginRequest {
            email: "sara@example.com".into(),
            password: "motdepasse".into(),
            admin: true,
        },
    )
    .await;
    assert!(matches!(wrong_table, Err(AppError::Unauthorized(_))));

    let duplicate = auth_service::register_user(&state, register_request("sara@example.com")).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn admin_login_carries_admin_role() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let admin = create_admin(&state, "root@example.com").await?;

    let login = auth_service::login(
        &state,
        LoginRequest {
            email: "root@example.com".into(),
            password: "secret123".into(),
            admin: true,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(login.role, Role::Admin);

    let principal = verify_token(&login.token, JWT_SECRET)?;
    assert_eq!(principal, admin);
    assert!(matches!(
        auth_service::profile(&state, principal).await?.data.unwrap(),
        Profile::Admin(_)
    ));
    Ok(())
}
