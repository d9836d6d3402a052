use fashion_store_api::{
    config::AppConfig,
    db::{create_orm_conn, sync_schema},
    dto::{
        catalog::{CreateCategoryRequest, CreateColorRequest, CreateSizeRequest},
        products::CreateProductRequest,
        users::{CreateAdminRequest, CreateUserRequest},
    },
    error::{AppError, AppResult},
    response::ApiResponse,
    services::{
        admin_service, category_service, color_service, product_service, size_service,
        user_service,
    },
    state::AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("info"))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    sync_schema(&orm).await?;
    let state = AppState::new(orm, config);

    seed_accounts(&state).await?;
    let category_id = seed_catalog(&state).await?;
    seed_products(&state, category_id).await?;

    println!("Seed completed");
    Ok(())
}

/// Treats an already existing row as success so the seed can be re-run.
fn ensured<T>(label: &str, result: AppResult<ApiResponse<T>>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(resp) => {
            println!("Created {label}");
            Ok(resp.data)
        }
        Err(AppError::Conflict(_)) => {
            println!("Kept existing {label}");
            Ok(None)
        }
        Err(err) => Err(anyhow::anyhow!("{label}: {err}")),
    }
}

async fn seed_accounts(state: &AppState) -> anyhow::Result<()> {
    ensured(
        "admin admin@example.com",
        admin_service::create_admin(
            state,
            CreateAdminRequest {
                name: "Store Admin".into(),
                email: "admin@example.com".into(),
                password: "admin123".into(),
            },
        )
        .await,
    )?;
    ensured(
        "user user@example.com",
        user_service::create_user(
            state,
            CreateUserRequest {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: "user@example.com".into(),
                password: "user123".into(),
                phone: Some("0600000000".into()),
                city: Some("Casablanca".into()),
                address: Some("12 Rue des Fleurs".into()),
            },
        )
        .await,
    )?;
    Ok(())
}

async fn seed_catalog(state: &AppState) -> anyhow::Result<Option<i32>> {
    let mut first_category = None;
    for (name, description) in [
        ("Robes", "Robes de soirée et de jour"),
        ("Vestes", "Vestes et manteaux"),
        ("Accessoires", "Sacs, ceintures et foulards"),
    ] {
        let created = ensured(
            &format!("category {name}"),
            category_service::create_category(
                state,
                CreateCategoryRequest {
                    name: name.into(),
                    description: Some(description.into()),
                },
            )
            .await,
        )?;
        if first_category.is_none() {
            first_category = created.map(|category| category.id);
        }
    }

    for (name, code) in [("Noir", "#000000"), ("Blanc", "#FFFFFF"), ("Rouge", "#C0392B")] {
        ensured(
            &format!("color {name}"),
            color_service::create_color(
                state,
                CreateColorRequest {
                    name: name.into(),
                    code: Some(code.into()),
                },
            )
            .await,
        )?;
    }

    for name in ["XS", "S", "M", "L", "XL"] {
        ensured(
            &format!("size {name}"),
            size_service::create_size(
                state,
                CreateSizeRequest {
                    name: name.into(),
                    description: None,
                },
            )
            .await,
        )?;
    }

    Ok(first_category)
}

async fn seed_products(state: &AppState, category_id: Option<i32>) -> anyhow::Result<()> {
    let products = [
        ("Robe Lina", "Robe longue en lin", 499.0, 20),
        ("Robe Sara", "Robe courte plissée", 349.9, 35),
        ("Veste Nour", "Veste en jean oversize", 620.0, 12),
    ];

    for (name, description, price, stock) in products {
        ensured(
            &format!("product {name}"),
            product_service::create_product(
                state,
                CreateProductRequest {
                    name: name.into(),
                    description: Some(description.into()),
                    price,
                    stock,
                    category_id,
                    color_ids: Vec::new(),
                    size_ids: Vec::new(),
                },
            )
            .await,
        )?;
    }
    Ok(())
}
