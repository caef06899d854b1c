use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::entities::category::Entity as Category;
use crate::entities::store::Entity as Store;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub store_id: i32,
    pub category_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub stock: u32,
    /// Arithmetic mean of all ratings, 0.0 when the product has none.
    pub rating: f64,
    pub rating_count: u32,
    #[sea_orm(default = false)]
    pub featured: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Category",
        from = "Column::CategoryId",
        to = "crate::entities::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(
        belongs_to = "Store",
        from = "Column::StoreId",
        to = "crate::entities::store::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Store,
    #[sea_orm(has_many = "crate::entities::product_image::Entity")]
    Image,
    #[sea_orm(has_many = "crate::entities::product_rating::Entity")]
    Rating,
}

impl Related<Category> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<Store> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl Related<crate::entities::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Image.def()
    }
}

impl Related<crate::entities::product_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
