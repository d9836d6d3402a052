use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub slug: String,
    /// URL of the primary gallery image, kept in sync by the image service.
    pub image: Option<String>,
    pub category_id: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
    #[sea_orm(has_many = "super::product_images::Entity")]
    ProductImages,
    #[sea_orm(has_many = "super::product_colors::Entity")]
    ProductColors,
    #[sea_orm(has_many = "super::product_sizes::Entity")]
    ProductSizes,
    #[sea_orm(has_many = "super::order_products::Entity")]
    OrderProducts,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::product_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductImages.def()
    }
}

impl Related<super::order_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderProducts.def()
    }
}

impl Related<super::colors::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_colors::Relation::Colors.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_colors::Relation::Products.def().rev())
    }
}

impl Related<super::sizes::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_sizes::Relation::Sizes.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_sizes::Relation::Products.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
