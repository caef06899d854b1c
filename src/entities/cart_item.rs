use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::entities::product::Entity as Product;
use crate::entities::user::Entity as User;

//At most one row per (user, product); kept that way by merge-on-insert
//in the cart service, not by a table constraint.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: u32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "User",
        from = "Column::UserId",
        to = "crate::entities::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<User> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

//Soft reference: the join is declared for queries only, with no foreign
//key in the table. A product can vanish underneath a cart row and the
//projection has to keep returning that row.
impl Related<Product> for Entity {
    fn to() -> RelationDef {
        Entity::belongs_to(Product)
            .from(Column::ProductId)
            .to(crate::entities::product::Column::Id)
            .into()
    }
}

impl ActiveModelBehavior for ActiveModel {}
