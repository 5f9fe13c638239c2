//! Packing list entity - an ordered collection of items.
//!
//! A list is either live (attached to a trip) or a reusable template (no trip).
//! `list_type` is stored as text; see [`ListType`] for the accepted values,
//! including the pre-migration `"Day-of"` type.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw list type written by releases that predate the `is_day_of` flag.
pub const LEGACY_DAY_OF: &str = "Day-of";

/// The two list behaviors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// Things to pack; items carry a count
    Packing,
    /// Things to do; every item counts once
    Task,
}

impl ListType {
    /// Both list types, in display order.
    pub const ALL: [Self; 2] = [Self::Packing, Self::Task];

    /// Value stored in the `list_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Packing => "packing",
            Self::Task => "task",
        }
    }

    /// Parses a stored `list_type`, returning the type and whether the raw value
    /// implies a day-of list.
    ///
    /// `"Day-of"` maps to `(Packing, true)`. Unrecognized values fall back to
    /// `(Packing, false)` and are logged rather than rejected.
    #[must_use]
    pub fn from_raw(raw: &str) -> (Self, bool) {
        Self::parse(raw).unwrap_or_else(|| {
            tracing::warn!("Unrecognized list type {:?}, treating as packing", raw);
            (Self::Packing, false)
        })
    }

    /// Like [`ListType::from_raw`], but `None` for unrecognized values.
    #[must_use]
    pub fn parse(raw: &str) -> Option<(Self, bool)> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(LEGACY_DAY_OF) {
            Some((Self::Packing, true))
        } else if trimmed.eq_ignore_ascii_case("packing") {
            Some((Self::Packing, false))
        } else if trimmed.eq_ignore_ascii_case("task") {
            Some((Self::Task, false))
        } else {
            None
        }
    }

    /// Whether stored text is exactly the current spelling for some type.
    #[must_use]
    pub fn is_canonical(raw: &str) -> bool {
        Self::ALL.iter().any(|t| t.as_str() == raw)
    }

    /// Weight an item contributes to progress totals.
    #[must_use]
    pub fn item_weight(self, count: i32) -> i64 {
        match self {
            Self::Packing => i64::from(count.max(1)),
            Self::Task => 1,
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Packing list database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "packing_lists")]
pub struct Model {
    /// Unique identifier for the list
    #[sea_orm(primary_key)]
    pub id: i64,
    /// List name (e.g., "Clothes", "Before leaving")
    pub name: String,
    /// Stored list type: `"packing"` or `"task"` (legacy: `"Day-of"`)
    pub list_type: String,
    /// Whether this list is a reusable template
    pub is_template: bool,
    /// Whether this list belongs to the day-of rollup
    pub is_day_of: bool,
    /// Template only: materialized item counts follow the trip length
    pub count_as_days: bool,
    /// Position among lists of the same (trip, type, day-of) scope
    pub sort_order: i32,
    /// When the list was created
    pub created_at: DateTimeUtc,
    /// Packer who owns this list, if any
    pub user_id: Option<i64>,
    /// Trip this list is attached to; `None` for templates
    pub trip_id: Option<i64>,
}

impl Model {
    /// Effective type and day-of flag, honoring legacy stored values.
    #[must_use]
    pub fn kind(&self) -> (ListType, bool) {
        let (list_type, legacy_day_of) = ListType::from_raw(&self.list_type);
        (list_type, self.is_day_of || legacy_day_of)
    }

    /// Effective list type.
    #[must_use]
    pub fn list_type(&self) -> ListType {
        self.kind().0
    }

    /// Effective day-of flag.
    #[must_use]
    pub fn day_of(&self) -> bool {
        self.kind().1
    }
}

/// Defines relationships between PackingList and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Live lists belong to one trip
    #[sea_orm(
        belongs_to = "super::trip::Entity",
        from = "Column::TripId",
        to = "super::trip::Column::Id"
    )]
    Trip,
    /// Lists may be owned by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One list has many items
    #[sea_orm(has_many = "super::item::Entity")]
    Items,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_current_values() {
        assert_eq!(ListType::from_raw("packing"), (ListType::Packing, false));
        assert_eq!(ListType::from_raw("task"), (ListType::Task, false));
        assert_eq!(ListType::from_raw("Task"), (ListType::Task, false));
    }

    #[test]
    fn test_from_raw_legacy_day_of() {
        assert_eq!(ListType::from_raw("Day-of"), (ListType::Packing, true));
    }

    #[test]
    fn test_from_raw_unknown_defaults_to_packing() {
        assert_eq!(ListType::from_raw("Snacks"), (ListType::Packing, false));
        assert_eq!(ListType::from_raw(""), (ListType::Packing, false));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(ListType::parse(" task "), Some((ListType::Task, false)));
        assert_eq!(ListType::parse("day-of"), Some((ListType::Packing, true)));
        assert_eq!(ListType::parse("tasks"), None);
    }

    #[test]
    fn test_item_weight() {
        assert_eq!(ListType::Packing.item_weight(4), 4);
        assert_eq!(ListType::Task.item_weight(4), 1);
        assert_eq!(ListType::Packing.item_weight(0), 1);
    }

    #[test]
    fn test_canonical_spelling() {
        assert!(ListType::is_canonical("packing"));
        assert!(!ListType::is_canonical("Packing"));
        assert!(!ListType::is_canonical(LEGACY_DAY_OF));
    }
}
