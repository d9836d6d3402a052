use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::{Index, IndexCreateStatement, TableCreateStatement},
};

use crate::entity::{
    Admins, Categories, Colors, OrderProducts, Orders, ProductColors, ProductImages, ProductSizes,
    Products, Sizes, Users, order_products,
};

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url);
    // An in-memory sqlite database only lives as long as its single connection.
    if database_url.starts_with("sqlite::memory:") {
        options.max_connections(1).min_connections(1);
    }
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Create every table and index from the entity definitions when missing.
///
/// Tables are created in foreign-key order so the same run works on postgres.
pub async fn sync_schema(conn: &DatabaseConnection) -> Result<()> {
    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);

    let tables: Vec<TableCreateStatement> = vec![
        table(&schema, Categories),
        table(&schema, Colors),
        table(&schema, Sizes),
        table(&schema, Users),
        table(&schema, Admins),
        table(&schema, Products),
        table(&schema, ProductColors),
        table(&schema, ProductSizes),
        table(&schema, ProductImages),
        table(&schema, Orders),
        table(&schema, OrderProducts),
    ];

    for stmt in &tables {
        conn.execute(backend.build(stmt)).await?;
    }

    for stmt in indexes() {
        conn.execute(backend.build(&stmt)).await?;
    }

    tracing::info!(tables = tables.len(), "schema synced");
    Ok(())
}

fn table<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    schema.create_table_from_entity(entity).if_not_exists().to_owned()
}

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_order_products_order_product")
            .table(OrderProducts)
            .col(order_products::Column::OrderId)
            .col(order_products::Column::ProductId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}
