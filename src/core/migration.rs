//! One-time data migration for databases written by older releases.
//!
//! Older releases stored day-of lists as a third list type (`"Day-of"`) and had
//! no position columns at all. The migration adds the missing columns, rewrites
//! those rows once, and records that it ran in the `system_state` table.

use crate::{
    core::ordering::{ListScope, sequential_orders},
    entities::{Item, ListType, PackingList, SystemState, item, packing_list, system_state},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{DbBackend, Set, Statement, TransactionTrait, prelude::*, sea_query::Expr};
use std::collections::HashMap;

const SORT_ORDER_BACKFILL_KEY: &str = "sort_order_backfill";

/// Columns that older `packing_lists` and `items` tables may lack.
const ADDED_COLUMNS: &[(&str, &str, &str)] = &[
    ("packing_lists", "is_day_of", "boolean NOT NULL DEFAULT 0"),
    ("packing_lists", "count_as_days", "boolean NOT NULL DEFAULT 0"),
    ("packing_lists", "sort_order", "integer NOT NULL DEFAULT 0"),
    ("items", "sort_order", "integer NOT NULL DEFAULT 0"),
    ("items", "unified_sort_order", "integer NOT NULL DEFAULT 0"),
];

/// What a migration run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Columns added to tables created by older releases
    pub columns_added: usize,
    /// Lists whose stored type was rewritten to the current spelling
    pub list_types_normalized: usize,
    /// Lists whose `sort_order` changed
    pub lists_reordered: usize,
    /// Items whose per-list `sort_order` changed
    pub items_reordered: usize,
    /// Items whose `unified_sort_order` changed
    pub items_unified: usize,
}

/// Whether the backfill has already been recorded.
pub async fn has_run<C>(db: &C) -> Result<bool>
where
    C: ConnectionTrait,
{
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(SORT_ORDER_BACKFILL_KEY))
        .one(db)
        .await?;
    Ok(state.is_some())
}

async fn mark_done<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    system_state::ActiveModel {
        key: Set(SORT_ORDER_BACKFILL_KEY.to_string()),
        value: Set(now.to_rfc3339()),
        updated_at: Set(now.naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn table_columns<C>(db: &C, table: &str) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let rows = db
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            format!("PRAGMA table_info({table})"),
        ))
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String>("", "name").map_err(Into::into))
        .collect()
}

/// Adds the columns in [`ADDED_COLUMNS`] that a table does not have yet.
///
/// `create_tables` leaves existing tables alone, so a database written by an
/// older release still has its original table shape at this point. New columns
/// start at zero and are filled in by the backfill.
async fn add_missing_columns<C>(db: &C) -> Result<usize>
where
    C: ConnectionTrait,
{
    if db.get_database_backend() != DbBackend::Sqlite {
        tracing::debug!("Skipping column upgrade on non-SQLite backend");
        return Ok(0);
    }

    let mut added = 0;
    for &(table, column, definition) in ADDED_COLUMNS {
        if table_columns(db, table).await?.iter().any(|c| c == column) {
            continue;
        }
        tracing::info!("Adding column {}.{}", table, column);
        db.execute_unprepared(&format!(
            "ALTER TABLE {table} ADD COLUMN {column} {definition}"
        ))
        .await?;
        added += 1;
    }
    Ok(added)
}

/// Rewrites legacy list types in memory and in storage.
async fn normalize_list_types<C>(db: &C, lists: &mut [packing_list::Model]) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut normalized = 0;
    for list in lists.iter_mut() {
        if ListType::is_canonical(&list.list_type) {
            continue;
        }
        let (list_type, is_day_of) = list.kind();
        tracing::info!(
            "Normalizing list {} type {:?} to {} (day-of: {})",
            list.id,
            list.list_type,
            list_type,
            is_day_of
        );

        let mut active_model: packing_list::ActiveModel = list.clone().into();
        active_model.list_type = Set(list_type.as_str().to_string());
        active_model.is_day_of = Set(is_day_of);
        *list = active_model.update(db).await?;
        normalized += 1;
    }
    Ok(normalized)
}

async fn backfill_list_orders<C>(db: &C, lists: &[packing_list::Model]) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut scopes: HashMap<ListScope, Vec<(i64, DateTimeUtc)>> = HashMap::new();
    let mut current: HashMap<i64, i32> = HashMap::with_capacity(lists.len());
    for list in lists {
        scopes
            .entry(ListScope::of(list))
            .or_default()
            .push((list.id, list.created_at));
        current.insert(list.id, list.sort_order);
    }

    let mut changed = 0;
    for records in scopes.values() {
        for (id, position) in sequential_orders(records)? {
            if current.get(&id) == Some(&position) {
                continue;
            }
            PackingList::update_many()
                .col_expr(packing_list::Column::SortOrder, Expr::value(position))
                .filter(packing_list::Column::Id.eq(id))
                .exec(db)
                .await?;
            changed += 1;
        }
    }
    Ok(changed)
}

async fn backfill_item_orders<C>(db: &C, items: &[item::Model]) -> Result<(usize, usize)>
where
    C: ConnectionTrait,
{
    let mut per_list: HashMap<i64, Vec<(i64, DateTimeUtc)>> = HashMap::new();
    let mut current: HashMap<i64, (i32, i32)> = HashMap::with_capacity(items.len());
    for it in items {
        per_list
            .entry(it.packing_list_id)
            .or_default()
            .push((it.id, it.created_at));
        current.insert(it.id, (it.sort_order, it.unified_sort_order));
    }

    let mut reordered = 0;
    for records in per_list.values() {
        for (id, position) in sequential_orders(records)? {
            if current.get(&id).is_some_and(|&(order, _)| order == position) {
                continue;
            }
            Item::update_many()
                .col_expr(item::Column::SortOrder, Expr::value(position))
                .filter(item::Column::Id.eq(id))
                .exec(db)
                .await?;
            reordered += 1;
        }
    }

    let all: Vec<(i64, DateTimeUtc)> = items.iter().map(|it| (it.id, it.created_at)).collect();
    let mut unified = 0;
    for (id, position) in sequential_orders(&all)? {
        if current.get(&id).is_some_and(|&(_, order)| order == position) {
            continue;
        }
        Item::update_many()
            .col_expr(item::Column::UnifiedSortOrder, Expr::value(position))
            .filter(item::Column::Id.eq(id))
            .exec(db)
            .await?;
        unified += 1;
    }

    Ok((reordered, unified))
}

/// Runs the legacy data migration once.
///
/// Adds missing columns, normalizes stored list types, then assigns list
/// positions per scope, item positions per list, and global item positions, all
/// by creation time. Everything happens in one transaction. Call it after
/// [`create_tables`](crate::config::database::create_tables) and before any
/// other operation touches an older database.
///
/// # Arguments
/// * `db` - Database connection
///
/// # Returns
/// * `Ok(Some(report))` - Migration ran; the report counts what changed
/// * `Ok(None)` - Migration was already recorded
pub async fn run_migrations(db: &DatabaseConnection) -> Result<Option<MigrationReport>> {
    if has_run(db).await? {
        tracing::debug!("Sort order backfill already applied");
        return Ok(None);
    }

    let txn = db.begin().await?;

    let columns_added = add_missing_columns(&txn).await?;
    let mut lists = PackingList::find().all(&txn).await?;
    let list_types_normalized = normalize_list_types(&txn, &mut lists).await?;
    let lists_reordered = backfill_list_orders(&txn, &lists).await?;

    let items = Item::find().all(&txn).await?;
    let (items_reordered, items_unified) = backfill_item_orders(&txn, &items).await?;

    mark_done(&txn).await?;
    txn.commit().await?;

    let report = MigrationReport {
        columns_added,
        list_types_normalized,
        lists_reordered,
        items_reordered,
        items_unified,
    };
    tracing::info!("Migration complete: {:?}", report);
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{item::get_items_for_list, packing_list::get_lists_for_trip};
    use crate::test_utils::*;
    use chrono::{Duration, TimeZone};
    use sea_orm::QueryOrder;

    fn at(minutes: i64) -> DateTimeUtc {
        Utc.with_ymd_and_hms(2023, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    /// Inserts a list the way older releases stored it: every position zero.
    async fn legacy_list(
        db: &DatabaseConnection,
        trip_id: Option<i64>,
        name: &str,
        list_type: &str,
        created_at: DateTimeUtc,
    ) -> Result<packing_list::Model> {
        let list = packing_list::ActiveModel {
            name: Set(name.to_string()),
            list_type: Set(list_type.to_string()),
            is_template: Set(trip_id.is_none()),
            is_day_of: Set(false),
            count_as_days: Set(false),
            sort_order: Set(0),
            created_at: Set(created_at),
            user_id: Set(None),
            trip_id: Set(trip_id),
            ..Default::default()
        };
        Ok(list.insert(db).await?)
    }

    async fn legacy_item(
        db: &DatabaseConnection,
        list_id: i64,
        name: &str,
        created_at: DateTimeUtc,
    ) -> Result<item::Model> {
        let it = item::ActiveModel {
            packing_list_id: Set(list_id),
            name: Set(name.to_string()),
            category: Set(String::new()),
            count: Set(1),
            is_packed: Set(false),
            sort_order: Set(0),
            unified_sort_order: Set(0),
            created_at: Set(created_at),
            ..Default::default()
        };
        Ok(it.insert(db).await?)
    }

    #[tokio::test]
    async fn test_migration_on_empty_database() -> Result<()> {
        let db = setup_test_db().await?;
        let report = run_migrations(&db).await?;
        assert_eq!(report, Some(MigrationReport::default()));
        assert!(has_run(&db).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_day_of_type_is_normalized() -> Result<()> {
        let (db, trip) = setup_with_trip().await?;
        let list = legacy_list(&db, Some(trip.id), "Grab", "Day-of", at(0)).await?;
        legacy_list(&db, Some(trip.id), "Errands", "Task", at(1)).await?;

        let report = run_migrations(&db).await?.unwrap();
        assert_eq!(report.list_types_normalized, 2);

        let lists = get_lists_for_trip(&db, trip.id).await?;
        let grab = lists.iter().find(|l| l.id == list.id).unwrap();
        assert_eq!(grab.list_type, "packing");
        assert!(grab.is_day_of);
        let errands = lists.iter().find(|l| l.name == "Errands").unwrap();
        assert_eq!(errands.list_type, "task");
        assert!(!errands.is_day_of);
        Ok(())
    }

    #[tokio::test]
    async fn test_sort_orders_backfilled_by_creation_time() -> Result<()> {
        let (db, trip) = setup_with_trip().await?;
        // Inserted out of creation order
        let second = legacy_list(&db, Some(trip.id), "Toiletries", "packing", at(10)).await?;
        let first = legacy_list(&db, Some(trip.id), "Clothes", "packing", at(5)).await?;
        let template = legacy_list(&db, None, "Basics", "packing", at(0)).await?;

        let late = legacy_item(&db, first.id, "Hat", at(30)).await?;
        let early = legacy_item(&db, first.id, "Socks", at(20)).await?;
        let other = legacy_item(&db, second.id, "Soap", at(25)).await?;

        let report = run_migrations(&db).await?.unwrap();
        assert_eq!(report.list_types_normalized, 0);
        assert_eq!(report.lists_reordered, 1);

        let lists = get_lists_for_trip(&db, trip.id).await?;
        let ids: Vec<i64> = lists.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        let template = PackingList::find_by_id(template.id).one(&db).await?.unwrap();
        assert_eq!(template.sort_order, 0);

        let items = get_items_for_list(&db, first.id).await?;
        let names: Vec<&str> = items.iter().map(|it| it.name.as_str()).collect();
        assert_eq!(names, vec!["Socks", "Hat"]);

        let unified: Vec<i64> = Item::find()
            .order_by_asc(item::Column::UnifiedSortOrder)
            .all(&db)
            .await?
            .into_iter()
            .map(|it| it.id)
            .collect();
        assert_eq!(unified, vec![early.id, other.id, late.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_upgrades_tables_without_position_columns() -> Result<()> {
        let db = sea_orm::Database::connect("sqlite::memory:").await?;
        db.execute_unprepared(
            "CREATE TABLE packing_lists (\
             id integer NOT NULL PRIMARY KEY AUTOINCREMENT, \
             name varchar NOT NULL, \
             list_type varchar NOT NULL, \
             is_template boolean NOT NULL, \
             created_at varchar NOT NULL, \
             user_id bigint, \
             trip_id bigint)",
        )
        .await?;
        db.execute_unprepared(
            "CREATE TABLE items (\
             id integer NOT NULL PRIMARY KEY AUTOINCREMENT, \
             packing_list_id bigint NOT NULL, \
             name varchar NOT NULL, \
             category varchar NOT NULL, \
             count integer NOT NULL, \
             is_packed boolean NOT NULL, \
             created_at varchar NOT NULL)",
        )
        .await?;
        crate::config::database::create_tables(&db).await?;
        let trip = create_test_trip(&db, "Peru").await?;

        db.execute_unprepared(&format!(
            "INSERT INTO packing_lists (name, list_type, is_template, created_at, trip_id) VALUES \
             ('Grab', 'Day-of', 0, '2023-05-01T09:05:00+00:00', {id}), \
             ('Clothes', 'packing', 0, '2023-05-01T09:00:00+00:00', {id})",
            id = trip.id
        ))
        .await?;
        db.execute_unprepared(
            "INSERT INTO items (packing_list_id, name, category, count, is_packed, created_at) VALUES \
             (1, 'Passport', '', 1, 0, '2023-05-01T09:10:00+00:00'), \
             (2, 'Socks', '', 3, 0, '2023-05-01T09:20:00+00:00'), \
             (2, 'Hat', '', 1, 1, '2023-05-01T09:15:00+00:00')",
        )
        .await?;

        let report = run_migrations(&db).await?.unwrap();
        assert_eq!(report.columns_added, ADDED_COLUMNS.len());
        assert_eq!(report.list_types_normalized, 1);

        let lists = get_lists_for_trip(&db, trip.id).await?;
        let kinds: Vec<(&str, &str, bool, i32)> = lists
            .iter()
            .map(|l| (l.name.as_str(), l.list_type.as_str(), l.is_day_of, l.sort_order))
            .collect();
        assert_eq!(
            kinds,
            vec![("Clothes", "packing", false, 0), ("Grab", "packing", true, 0)]
        );

        let names: Vec<String> = get_items_for_list(&db, 2)
            .await?
            .into_iter()
            .map(|it| it.name)
            .collect();
        assert_eq!(names, vec!["Hat", "Socks"]);

        let unified: Vec<String> = Item::find()
            .order_by_asc(item::Column::UnifiedSortOrder)
            .all(&db)
            .await?
            .into_iter()
            .map(|it| it.name)
            .collect();
        assert_eq!(unified, vec!["Passport", "Hat", "Socks"]);

        // Regular operations work on the upgraded tables
        let added = crate::core::item::create_item(&db, 2, "Scarf", "", 1).await?;
        assert_eq!(added.sort_order, 2);
        assert_eq!(added.unified_sort_order, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_migration_runs_once() -> Result<()> {
        let (db, trip) = setup_with_trip().await?;
        legacy_list(&db, Some(trip.id), "Grab", "Day-of", at(0)).await?;

        assert!(run_migrations(&db).await?.is_some());
        assert!(run_migrations(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_rerun_changes_nothing() -> Result<()> {
        let (db, trip) = setup_with_trip().await?;
        let list = legacy_list(&db, Some(trip.id), "Grab", "Day-of", at(0)).await?;
        legacy_item(&db, list.id, "Keys", at(1)).await?;
        legacy_item(&db, list.id, "Phone", at(2)).await?;
        run_migrations(&db).await?;

        // Forget the marker and run again over already-migrated rows
        SystemState::delete_many().exec(&db).await?;
        let report = run_migrations(&db).await?.unwrap();
        assert_eq!(report, MigrationReport::default());
        Ok(())
    }
}
