//! User entity - a packer who owns packing lists on shared trips.
//!
//! Lists reference their owner through `packing_lists.user_id`. Removing a user
//! removes the lists it owns (see `core::user::delete_user`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Alex")
    pub name: String,
    /// Color used to tag this packer's lists, as `#RRGGBB`
    pub color_tag: String,
    /// When the user was created; users are listed in this order
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many packing lists
    #[sea_orm(has_many = "super::packing_list::Entity")]
    PackingLists,
}

impl Related<super::packing_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackingLists.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
