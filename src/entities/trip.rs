//! Trip entity - a journey with an optional destination and date range.
//!
//! A trip aggregates the live (non-template) packing lists attached to it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Trip database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    /// Unique identifier for the trip
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Trip name (e.g., "Peru")
    pub name: String,
    /// Geocoded place name, if a location was picked
    pub location_name: Option<String>,
    /// Latitude of the picked location
    pub latitude: Option<f64>,
    /// Longitude of the picked location
    pub longitude: Option<f64>,
    /// First day of the trip
    pub start_date: Option<Date>,
    /// Last day of the trip
    pub end_date: Option<Date>,
    /// When the trip was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Number of calendar days the trip spans, counting both the first and last day.
    ///
    /// Returns `None` when either date is missing or the range is inverted.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        let (start, end) = (self.start_date?, self.end_date?);
        let days = (end - start).num_days() + 1;
        (days > 0).then_some(days)
    }
}

/// Defines relationships between Trip and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One trip has many packing lists
    #[sea_orm(has_many = "super::packing_list::Entity")]
    PackingLists,
}

impl Related<super::packing_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackingLists.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn trip(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Model {
        Model {
            id: 1,
            name: "Peru".to_string(),
            location_name: None,
            latitude: None,
            longitude: None,
            start_date: start,
            end_date: end,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_duration_counts_both_ends() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(trip(Some(start), Some(end)).duration_days(), Some(5));
        assert_eq!(trip(Some(start), Some(start)).duration_days(), Some(1));
    }

    #[test]
    fn test_duration_unknown() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(trip(None, None).duration_days(), None);
        assert_eq!(trip(Some(start), None).duration_days(), None);
        assert_eq!(trip(Some(start), Some(end)).duration_days(), None);
    }
}
