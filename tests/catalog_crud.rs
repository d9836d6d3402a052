mod common;

use common::{create_admin, create_category, create_color, create_size, create_user, setup_state};
use fashion_store_api::{
    dto::{
        catalog::{CreateCategoryRequest, CreateColorRequest, CreateSizeRequest, UpdateCategoryRequest, UpdateColorRequest},
        users::{CreateAdminRequest, CreateUserRequest, UpdateUserRequest},
    },
    entity::Categories,
    error::AppError,
    routes::params::SearchQuery,
    services::{admin_service, category_service, color_service, size_service, user_service},
};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn duplicate_natural_keys_conflict() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    create_category(&state, "Robes").await?;
    create_color(&state, "Noir").await?;
    create_size(&state, "M").await?;
    create_user(&state, "amina@example.com").await?;
    create_admin(&state, "root@example.com").await?;

    let category = category_service::create_category(
        &state,
        CreateCategoryRequest {
            name: "Robes".into(),
            description: None,
        },
    )
    .await;
    assert!(matches!(category, Err(AppError::Conflict(_))));

    let color = color_service::create_color(
        &state,
        CreateColorRequest {
            name: "Noir".into(),
            code: Some("#000".into()),
        },
    )
    .await;
    assert!(matches!(color, Err(AppError::Conflict(_))));

    let size = size_service::create_size(
        &state,
        CreateSizeRequest {
            name: "M".into(),
            description: None,
        },
    )
    .await;
    assert!(matches!(size, Err(AppError::Conflict(_))));

    // emails are compared case-insensitively
    let user = user_service::create_user(
        &state,
        CreateUserRequest {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "Amina@Example.com".into(),
            password: "secret123".into(),
            phone: None,
            city: None,
            address: None,
        },
    )
    .await;
    assert!(matches!(user, Err(AppError::Conflict(_))));

    let admin = admin_service::create_admin(
        &state,
        CreateAdminRequest {
            name: "Other".into(),
            email: "root@example.com".into(),
            password: "secret123".into(),
        },
    )
    .await;
    assert!(matches!(admin, Err(AppError::Conflict(_))));

    assert_eq!(Categories::find().count(&state.orm).await?, 1);
    Ok(())
}

#[tokio::test]
async fn missing_ids_are_not_found() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;

    assert!(matches!(
        category_service::get_category(&state, 42).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        color_service::get_color(&state, 42).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        size_service::get_size(&state, 42).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        user_service::get_user(&state, 42).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        admin_service::get_admin(&state, 42).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        user_service::update_user(&state, 42, UpdateUserRequest::default()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        color_service::delete_color(&state, 42).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn soft_deleted_rows_disappear_and_free_their_name() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let id = create_category(&state, "Robes").await?;

    category_service::delete_category(&state, id).await?;
    assert!(matches!(
        category_service::get_category(&state, id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        category_service::delete_category(&state, id).await,
        Err(AppError::NotFound(_))
    ));

    // the row is still there, only marked deleted
    assert_eq!(Categories::find().count(&state.orm).await?, 1);

    let listed = category_service::list_categories(&state, SearchQuery::default())
        .await?
        .data
        .unwrap();
    assert!(listed.items.is_empty());

    create_category(&state, "Robes").await?;
    Ok(())
}

#[tokio::test]
async fn update_rechecks_names_and_refreshes_slug() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let robes = create_category(&state, "Robes").await?;
    create_category(&state, "Vestes").await?;

    let clash = category_service::update_category(
        &state,
        robes,
        UpdateCategoryRequest {
            name: Some("Vestes".into()),
            description: None,
        },
    )
    .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    let renamed = category_service::update_category(
        &state,
        robes,
        UpdateCategoryRequest {
            name: Some("Robes d'été".into()),
            description: Some("Collection estivale".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(renamed.name, "Robes d'été");
    assert_ne!(renamed.slug, "robes");

    // keeping the same name is not a conflict with itself
    let noir = create_color(&state, "Noir").await?;
    color_service::update_color(
        &state,
        noir,
        UpdateColorRequest {
            name: Some("Noir".into()),
            code: Some("#111111".into()),
        },
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn list_searches_by_name_with_pagination() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    for name in ["Noir", "Blanc", "Bleu nuit", "Bleu ciel"] {
        create_color(&state, name).await?;
    }

    let resp = color_service::list_colors(
        &state,
        SearchQuery {
            page: Some(1),
            per_page: Some(1),
            q: Some("BLEU".into()),
        },
    )
    .await?;
    assert_eq!(resp.meta.as_ref().and_then(|m| m.total), Some(2));
    let page = resp.data.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Bleu ciel");
    Ok(())
}
