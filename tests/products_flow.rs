mod common;

use common::{
    contact, create_category, create_color, create_product, create_size, create_user, line, png,
    setup_state,
};
use fashion_store_api::{
    dto::{
        orders::CheckoutRequest,
        products::{AttachColorsRequest, AttachSizesRequest, CreateProductRequest, UpdateProductRequest},
    },
    entity::{ProductColors, ProductImages},
    error::AppError,
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{order_service, product_image_service, product_service},
};
use sea_orm::{EntityTrait, PaginatorTrait};

// "Robes" category, "Robe A" with Noir and M: the detail view carries every name.
#[tokio::test]
async fn product_detail_shows_category_colors_and_sizes() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let robes = create_category(&state, "Robes").await?;
    let noir = create_color(&state, "Noir").await?;
    let medium = create_size(&state, "M").await?;

    let created = product_service::create_product(
        &state,
        CreateProductRequest {
            name: "Robe A".into(),
            description: Some("Robe longue".into()),
            price: 199.99,
            stock: 5,
            category_id: Some(robes),
            color_ids: Vec::new(),
            size_ids: Vec::new(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.product.slug, "robe-a");
    let id = created.product.id;

    product_service::attach_colors(&state, id, AttachColorsRequest { color_ids: vec![noir] }).await?;
    product_service::attach_sizes(&state, id, AttachSizesRequest { size_ids: vec![medium] }).await?;

    let detail = product_service::get_product(&state, id).await?.data.unwrap();
    assert_eq!(detail.product.price, 199.99);
    assert_eq!(detail.product.stock, 5);
    assert_eq!(detail.colors, vec!["Noir".to_string()]);
    assert_eq!(detail.sizes, vec!["M".to_string()]);
    assert_eq!(detail.category.map(|c| c.name).as_deref(), Some("Robes"));
    assert!(detail.images.is_empty());
    Ok(())
}

#[tokio::test]
async fn attaching_is_idempotent_and_detaching_checks_membership() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let noir = create_color(&state, "Noir").await?;
    let blanc = create_color(&state, "Blanc").await?;
    let id = create_product(&state, "Robe A", 199.99, None).await?;

    product_service::attach_colors(&state, id, AttachColorsRequest { color_ids: vec![noir, noir] }).await?;
    let detail = product_service::attach_colors(
        &state,
        id,
        AttachColorsRequest {
            color_ids: vec![noir, blanc],
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(detail.colors, vec!["Blanc".to_string(), "Noir".to_string()]);
    assert_eq!(ProductColors::find().count(&state.orm).await?, 2);

    let unknown = product_service::attach_colors(&state, id, AttachColorsRequest { color_ids: vec![999] }).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    product_service::detach_color(&state, id, noir).await?;
    let again = product_service::detach_color(&state, id, noir).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));

    let listed = product_service::list_colors(&state, id).await?.data.unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].id, blanc);
    Ok(())
}

#[tokio::test]
async fn create_rejects_duplicates_and_unknown_category() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    create_product(&state, "Robe A", 199.99, None).await?;

    let duplicate = create_product(&state, "Robe A", 150.0, None).await;
    assert!(duplicate.is_err());

    let orphan = product_service::create_product(
        &state,
        CreateProductRequest {
            name: "Robe B".into(),
            description: None,
            price: 100.0,
            stock: 1,
            category_id: Some(77),
            color_ids: Vec::new(),
            size_ids: Vec::new(),
        },
    )
    .await;
    assert!(matches!(orphan, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn update_changes_fields_and_slug() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let id = create_product(&state, "Robe A", 199.99, None).await?;

    let updated = product_service::update_product(
        &state,
        id,
        UpdateProductRequest {
            name: Some("Robe Azur".into()),
            price: Some(179.0),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.slug, "robe-azur");
    assert_eq!(updated.price, 179.0);
    assert_eq!(updated.stock, 10);

    let missing = product_service::update_product(&state, 999, UpdateProductRequest::default()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn list_filters_by_price_and_category() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let robes = create_category(&state, "Robes").await?;
    create_product(&state, "Robe A", 199.99, Some(robes)).await?;
    create_product(&state, "Robe B", 89.0, Some(robes)).await?;
    create_product(&state, "Veste C", 450.0, None).await?;

    let resp = product_service::list_products(
        &state,
        ProductQuery {
            category_id: Some(robes),
            min_price: Some(50.0),
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(resp.meta.as_ref().and_then(|m| m.total), Some(2));
    let names: Vec<String> = resp.data.unwrap().items.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Robe B".to_string(), "Robe A".to_string()]);

    let searched = product_service::list_products(
        &state,
        ProductQuery {
            q: Some("veste".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(searched.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn delete_removes_images_rows_and_files() -> anyhow::Result<()> {
    let (state, uploads) = setup_state().await?;
    let noir = create_color(&state, "Noir").await?;
    let id = create_product(&state, "Robe A", 199.99, None).await?;
    product_service::attach_colors(&state, id, AttachColorsRequest { color_ids: vec![noir] }).await?;
    product_image_service::upload_images_bulk(&state, id, vec![png("a.png"), png("b.png")]).await?;

    let stored = std::fs::read_dir(uploads.path().join("products"))?.count();
    assert_eq!(stored, 2);

    product_service::delete_product(&state, id).await?;

    assert_eq!(ProductImages::find().count(&state.orm).await?, 0);
    assert_eq!(ProductColors::find().count(&state.orm).await?, 0);
    assert_eq!(std::fs::read_dir(uploads.path().join("products"))?.count(), 0);
    assert!(matches!(
        product_service::get_product(&state, id).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn ordered_products_cannot_be_deleted() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let customer = create_user(&state, "amina@example.com").await?;
    let id = create_product(&state, "Robe A", 199.99, None).await?;
    product_image_service::upload_image(&state, id, png("a.png")).await?;
    order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            contact: contact(),
            products: vec![line(id, 1, 199.99, None, None)],
        },
    )
    .await?;

    let err = product_service::delete_product(&state, id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
    // the rollback keeps the gallery intact
    assert_eq!(ProductImages::find().count(&state.orm).await?, 1);
    Ok(())
}
