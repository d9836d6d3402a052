mod common;

use common::{create_product, png, setup_state};
use fashion_store_api::{
    dto::product_images::UpdateImageRequest,
    error::AppError,
    services::{product_image_service, product_service},
    storage::UploadedFile,
};

#[tokio::test]
async fn first_upload_becomes_primary_and_second_does_not() -> anyhow::Result<()> {
    let (state, uploads) = setup_state().await?;
    let id = create_product(&state, "Robe A", 199.99, None).await?;

    let first = product_image_service::upload_image(&state, id, png("a.png"))
        .await?
        .data
        .unwrap();
    assert!(first.is_primary);
    assert!(first.url.starts_with("/uploads/products/"));
    assert!(first.url.ends_with(".png"));

    let second = product_image_service::upload_image(&state, id, png("b.png"))
        .await?
        .data
        .unwrap();
    assert!(!second.is_primary);
    assert!(second.display_order > first.display_order);

    let product = product_service::get_product(&state, id).await?.data.unwrap();
    assert_eq!(product.product.image.as_deref(), Some(first.url.as_str()));
    assert_eq!(std::fs::read_dir(uploads.path().join("products"))?.count(), 2);
    Ok(())
}

#[tokio::test]
async fn set_primary_leaves_exactly_one_primary() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let id = create_product(&state, "Robe A", 199.99, None).await?;
    let images = product_image_service::upload_images_bulk(
        &state,
        id,
        vec![png("a.png"), png("b.png"), png("c.png")],
    )
    .await?
    .data
    .unwrap()
    .items;
    assert_eq!(images.iter().filter(|i| i.is_primary).count(), 1);
    assert!(images[0].is_primary);

    let target = images[2].id;
    product_image_service::set_primary(&state, id, target).await?;

    let listed = product_image_service::list_images(&state, id).await?.data.unwrap().items;
    let primaries: Vec<i32> = listed.iter().filter(|i| i.is_primary).map(|i| i.id).collect();
    assert_eq!(primaries, vec![target]);

    let product = product_service::get_product(&state, id).await?.data.unwrap();
    assert_eq!(product.product.image.as_deref(), Some(images[2].url.as_str()));

    // update_image with is_primary goes through the same switch
    product_image_service::update_image(
        &state,
        images[1].id,
        UpdateImageRequest {
            display_order: Some(0),
            is_primary: Some(true),
        },
    )
    .await?;
    let listed = product_image_service::list_images(&state, id).await?.data.unwrap().items;
    let primaries: Vec<i32> = listed.iter().filter(|i| i.is_primary).map(|i| i.id).collect();
    assert_eq!(primaries, vec![images[1].id]);
    Ok(())
}

#[tokio::test]
async fn set_primary_requires_image_of_that_product() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let robe = create_product(&state, "Robe A", 199.99, None).await?;
    let veste = create_product(&state, "Veste B", 350.0, None).await?;
    let image = product_image_service::upload_image(&state, robe, png("a.png"))
        .await?
        .data
        .unwrap();

    let err = product_image_service::set_primary(&state, veste, image.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn deleting_the_primary_promotes_nothing() -> anyhow::Result<()> {
    let (state, uploads) = setup_state().await?;
    let id = create_product(&state, "Robe A", 199.99, None).await?;
    let first = product_image_service::upload_image(&state, id, png("a.png"))
        .await?
        .data
        .unwrap();
    product_image_service::upload_image(&state, id, png("b.png")).await?;

    product_image_service::delete_image(&state, first.id).await?;

    let listed = product_image_service::list_images(&state, id).await?.data.unwrap().items;
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].is_primary);

    let product = product_service::get_product(&state, id).await?.data.unwrap();
    assert_eq!(product.product.image, None);
    assert_eq!(std::fs::read_dir(uploads.path().join("products"))?.count(), 1);

    assert!(matches!(
        product_image_service::delete_image(&state, first.id).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn upload_main_image_takes_over_primary() -> anyhow::Result<()> {
    let (state, _uploads) = setup_state().await?;
    let id = create_product(&state, "Robe A", 199.99, None).await?;
    product_image_service::upload_image(&state, id, png("a.png")).await?;

    let main = product_image_service::upload_main_image(&state, id, png("main.png"))
        .await?
        .data
        .unwrap();
    assert!(main.is_primary);

    let listed = product_image_service::list_images(&state, id).await?.data.unwrap().items;
    assert_eq!(listed.iter().filter(|i| i.is_primary).count(), 1);
    Ok(())
}

#[tokio::test]
async fn rejected_files_leave_no_rows_or_files() -> anyhow::Result<()> {
    let (state, uploads) = setup_state().await?;
    let id = create_product(&state, "Robe A", 199.99, None).await?;

    let text = UploadedFile {
        file_name: Some("notes.txt".into()),
        content_type: Some("text/plain".into()),
        bytes: b"hello".to_vec().into(),
    };
    let err = product_image_service::upload_images_bulk(&state, id, vec![png("a.png"), text])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let empty = product_image_service::upload_images_bulk(&state, id, Vec::new()).await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));

    let missing = product_image_service::upload_image(&state, 999, png("a.png")).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    assert!(product_image_service::list_images(&state, id).await?.data.unwrap().items.is_empty());
    let products_dir = uploads.path().join("products");
    let stored = if products_dir.exists() {
        std::fs::read_dir(products_dir)?.count()
    } else {
        0
    };
    assert_eq!(stored, 0);

    let cleared = product_image_service::update_image(
        &state,
        1,
        UpdateImageRequest {
            display_order: None,
            is_primary: Some(false),
        },
    )
    .await;
    assert!(matches!(cleared, Err(AppError::BadRequest(_))));
    Ok(())
}
