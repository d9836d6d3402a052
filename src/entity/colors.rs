use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "colors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_colors::Entity")]
    ProductColors,
}

impl Related<super::product_colors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductColors.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_colors::Relation::Products.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_colors::Relation::Colors.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
