//! Item entity - a single thing to pack or task to do.
//!
//! Items belong to exactly one packing list. `sort_order` orders items inside
//! their list; `unified_sort_order` orders items across every list.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the packing list that owns this item
    pub packing_list_id: i64,
    /// What to pack or do (e.g., "Socks", "Water the plants")
    pub name: String,
    /// Informational category (e.g., "Clothing")
    pub category: String,
    /// How many to pack; always 1 on task lists
    pub count: i32,
    /// Whether the item is packed (or the task is done)
    pub is_packed: bool,
    /// Position inside the owning list
    pub sort_order: i32,
    /// Position across all items
    pub unified_sort_order: i32,
    /// When the item was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one packing list
    #[sea_orm(
        belongs_to = "super::packing_list::Entity",
        from = "Column::PackingListId",
        to = "super::packing_list::Column::Id"
    )]
    PackingList,
}

impl Related<super::packing_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackingList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
