//! Trip business logic - Handles trip creation, editing, location, and deletion.
//!
//! Deleting a trip deletes its live lists and their items. Templates are never
//! attached to trips, so they survive.

use crate::{
    core::{location::PlaceResult, packing_list::delete_lists_cascade},
    entities::{PackingList, Trip, packing_list, trip},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};

/// Editable trip fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripDetails {
    /// Trip name
    pub name: String,
    /// Picked destination
    pub location: Option<PlaceResult>,
    /// First day
    pub start_date: Option<NaiveDate>,
    /// Last day
    pub end_date: Option<NaiveDate>,
}

impl TripDetails {
    /// Details with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the date range.
    #[must_use]
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    fn validate(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::validation("Trip name cannot be empty"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(Error::validation(format!(
                    "Trip ends ({end}) before it starts ({start})"
                )));
            }
        }
        if let Some(place) = &self.location {
            place.validate()?;
        }
        Ok(name.to_string())
    }
}

fn location_columns(location: Option<PlaceResult>) -> (Option<String>, Option<f64>, Option<f64>) {
    location.map_or((None, None, None), |place| {
        (Some(place.name), Some(place.latitude), Some(place.longitude))
    })
}

/// Retrieves all trips, soonest first; undated trips come last in creation order.
pub async fn get_all_trips(db: &DatabaseConnection) -> Result<Vec<trip::Model>> {
    let mut trips = Trip::find()
        .order_by_asc(trip::Column::CreatedAt)
        .order_by_asc(trip::Column::Id)
        .all(db)
        .await?;
    // Stable sort keeps creation order inside equal keys
    trips.sort_by_key(|t| (t.start_date.is_none(), t.start_date));
    Ok(trips)
}

/// Finds a trip by its unique ID.
pub async fn get_trip_by_id<C>(db: &C, trip_id: i64) -> Result<Option<trip::Model>>
where
    C: ConnectionTrait,
{
    Trip::find_by_id(trip_id).one(db).await.map_err(Into::into)
}

/// Creates a trip.
///
/// # Errors
/// [`Error::Validation`] for an empty name, an inverted date range, or bad coordinates.
pub async fn create_trip(db: &DatabaseConnection, details: TripDetails) -> Result<trip::Model> {
    let name = details.validate()?;
    let (location_name, latitude, longitude) = location_columns(details.location);

    let trip = trip::ActiveModel {
        name: Set(name),
        location_name: Set(location_name),
        latitude: Set(latitude),
        longitude: Set(longitude),
        start_date: Set(details.start_date),
        end_date: Set(details.end_date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = trip.insert(db).await?;
    tracing::info!("Created trip '{}' ({})", result.name, result.id);
    Ok(result)
}

/// Replaces all editable fields of a trip.
pub async fn update_trip(
    db: &DatabaseConnection,
    trip_id: i64,
    details: TripDetails,
) -> Result<trip::Model> {
    let name = details.validate()?;
    let (location_name, latitude, longitude) = location_columns(details.location);

    let mut active_model: trip::ActiveModel = find_trip(db, trip_id).await?.into();
    active_model.name = Set(name);
    active_model.location_name = Set(location_name);
    active_model.latitude = Set(latitude);
    active_model.longitude = Set(longitude);
    active_model.start_date = Set(details.start_date);
    active_model.end_date = Set(details.end_date);
    active_model.update(db).await.map_err(Into::into)
}

/// Sets or clears only the trip's location, e.g. after a place search.
pub async fn set_trip_location(
    db: &DatabaseConnection,
    trip_id: i64,
    location: Option<PlaceResult>,
) -> Result<trip::Model> {
    if let Some(place) = &location {
        place.validate()?;
    }
    let (location_name, latitude, longitude) = location_columns(location);

    let mut active_model: trip::ActiveModel = find_trip(db, trip_id).await?.into();
    active_model.location_name = Set(location_name);
    active_model.latitude = Set(latitude);
    active_model.longitude = Set(longitude);
    active_model.update(db).await.map_err(Into::into)
}

async fn find_trip(db: &DatabaseConnection, trip_id: i64) -> Result<trip::Model> {
    get_trip_by_id(db, trip_id).await?.ok_or(Error::NotFound {
        entity: "Trip",
        id: trip_id,
    })
}

/// Deletes a trip, its lists, and their items in one transaction.
///
/// Returns `Ok(false)` when the trip was already gone.
pub async fn delete_trip(db: &DatabaseConnection, trip_id: i64) -> Result<bool> {
    let txn = db.begin().await?;

    let Some(trip) = get_trip_by_id(&txn, trip_id).await? else {
        tracing::debug!("Trip {} already deleted", trip_id);
        return Ok(false);
    };

    let lists: Vec<i64> = PackingList::find()
        .select_only()
        .column(packing_list::Column::Id)
        .filter(packing_list::Column::TripId.eq(trip_id))
        .into_tuple()
        .all(&txn)
        .await?;

    let removed_lists = delete_lists_cascade(&txn, &lists).await?;
    trip.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!("Deleted trip {} and {} lists", trip_id, removed_lists);
    Ok(true)
}
