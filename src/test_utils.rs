//! Shared test utilities for `PackingBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::features::FeatureFlags,
    core::{item, packing_list, trip, user},
    entities::{self, ListType},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an undated trip with no location.
pub async fn create_test_trip(db: &DatabaseConnection, name: &str) -> Result<entities::trip::Model> {
    trip::create_trip(db, trip::TripDetails::named(name)).await
}

/// Creates a live list on a trip.
///
/// # Defaults
/// * `is_day_of`: false
/// * owner: none
pub async fn create_test_list(
    db: &DatabaseConnection,
    trip_id: i64,
    name: &str,
    list_type: ListType,
) -> Result<entities::packing_list::Model> {
    packing_list::create_packing_list(db, trip_id, name, list_type, false, None).await
}

/// Creates an item with an empty category.
pub async fn create_test_item(
    db: &DatabaseConnection,
    packing_list_id: i64,
    name: &str,
    count: i32,
) -> Result<entities::item::Model> {
    item::create_item(db, packing_list_id, name, "", count).await
}

/// Creates a packer. Plus is unlocked so tests can add several.
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<entities::user::Model> {
    user::create_user(db, &FeatureFlags::plus(), name, "#3366FF").await
}

/// Sets up a test environment with one trip.
/// Returns (db, trip).
pub async fn setup_with_trip() -> Result<(DatabaseConnection, entities::trip::Model)> {
    let db = setup_test_db().await?;
    let trip = create_test_trip(&db, "Test Trip").await?;
    Ok((db, trip))
}

/// Sets up a test environment with a trip and one empty packing list.
/// Returns (db, trip, list).
pub async fn setup_with_list() -> Result<(
    DatabaseConnection,
    entities::trip::Model,
    entities::packing_list::Model,
)> {
    let (db, trip) = setup_with_trip().await?;
    let list = create_test_list(&db, trip.id, "Clothes", ListType::Packing).await?;
    Ok((db, trip, list))
}
