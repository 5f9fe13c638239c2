//! Packing list business logic - Handles list creation, lookup, editing and deletion.
//!
//! Live lists hang off a trip; templates float free and are copied into trips by
//! `core::template`. Deleting a list deletes its items.

use crate::{
    core::ordering::{self, ListScope},
    entities::{Item, ListType, PackingList, Trip, User, item, packing_list},
    errors::{Error, Result},
};
use sea_orm::{
    PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr,
};

/// Validates a list name, returning it trimmed.
pub(crate) fn validate_list_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("List name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Finds a list by its unique ID.
pub async fn get_packing_list_by_id<C>(db: &C, list_id: i64) -> Result<Option<packing_list::Model>>
where
    C: ConnectionTrait,
{
    PackingList::find_by_id(list_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the lists of a trip grouped by type and day-of flag, each group in
/// `sort_order`.
pub async fn get_lists_for_trip<C>(db: &C, trip_id: i64) -> Result<Vec<packing_list::Model>>
where
    C: ConnectionTrait,
{
    PackingList::find()
        .filter(packing_list::Column::TripId.eq(trip_id))
        .filter(packing_list::Column::IsTemplate.eq(false))
        .order_by_asc(packing_list::Column::ListType)
        .order_by_asc(packing_list::Column::IsDayOf)
        .order_by_asc(packing_list::Column::SortOrder)
        .order_by_asc(packing_list::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the lists owned by a user.
pub async fn get_lists_for_user<C>(db: &C, user_id: i64) -> Result<Vec<packing_list::Model>>
where
    C: ConnectionTrait,
{
    PackingList::find()
        .filter(packing_list::Column::UserId.eq(user_id))
        .order_by_asc(packing_list::Column::SortOrder)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Checks that a live list on this trip may have the given owner.
///
/// When more than one packer exists, every live list needs an owner so the
/// per-packer views stay complete.
pub(crate) async fn check_owner<C>(db: &C, owner: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    match owner {
        Some(user_id) => {
            if User::find_by_id(user_id).one(db).await?.is_none() {
                return Err(Error::NotFound {
                    entity: "User",
                    id: user_id,
                });
            }
        }
        None => {
            if User::find().count(db).await? > 1 {
                return Err(Error::validation(
                    "Lists on a trip with several packers need an owner",
                ));
            }
        }
    }
    Ok(())
}

/// Creates a blank list on a trip, placed after the other lists of the same
/// type and day-of flag.
///
/// # Errors
/// - [`Error::Validation`] for an empty name, or a missing owner when several packers exist
/// - [`Error::NotFound`] when the trip or owner does not exist
pub async fn create_packing_list(
    db: &DatabaseConnection,
    trip_id: i64,
    name: &str,
    list_type: ListType,
    is_day_of: bool,
    owner: Option<i64>,
) -> Result<packing_list::Model> {
    let name = validate_list_name(name)?;

    if Trip::find_by_id(trip_id).one(db).await?.is_none() {
        return Err(Error::NotFound {
            entity: "Trip",
            id: trip_id,
        });
    }
    check_owner(db, owner).await?;

    let sort_order = ordering::next_list_sort_order(
        db,
        ListScope {
            trip_id: Some(trip_id),
            list_type,
            is_day_of,
        },
    )
    .await?;

    let list = packing_list::ActiveModel {
        name: Set(name),
        list_type: Set(list_type.as_str().to_string()),
        is_template: Set(false),
        is_day_of: Set(is_day_of),
        count_as_days: Set(false),
        sort_order: Set(sort_order),
        created_at: Set(chrono::Utc::now()),
        user_id: Set(owner),
        trip_id: Set(Some(trip_id)),
        ..Default::default()
    };

    let result = list.insert(db).await?;
    tracing::info!("Created {} list '{}' on trip {}", list_type, result.name, trip_id);
    Ok(result)
}

/// Creates an empty template list.
pub async fn create_template_list(
    db: &DatabaseConnection,
    name: &str,
    list_type: ListType,
    is_day_of: bool,
    count_as_days: bool,
) -> Result<packing_list::Model> {
    let name = validate_list_name(name)?;
    insert_template(db, name, list_type, is_day_of, count_as_days).await
}

/// Inserts a template row at the end of its scope.
pub(crate) async fn insert_template<C>(
    db: &C,
    name: String,
    list_type: ListType,
    is_day_of: bool,
    count_as_days: bool,
) -> Result<packing_list::Model>
where
    C: ConnectionTrait,
{
    let sort_order = ordering::next_list_sort_order(
        db,
        ListScope {
            trip_id: None,
            list_type,
            is_day_of,
        },
    )
    .await?;

    let template = packing_list::ActiveModel {
        name: Set(name),
        list_type: Set(list_type.as_str().to_string()),
        is_template: Set(true),
        is_day_of: Set(is_day_of),
        count_as_days: Set(count_as_days),
        sort_order: Set(sort_order),
        created_at: Set(chrono::Utc::now()),
        user_id: Set(None),
        trip_id: Set(None),
        ..Default::default()
    };

    template.insert(db).await.map_err(Into::into)
}

async fn find_list(db: &DatabaseConnection, list_id: i64) -> Result<packing_list::Model> {
    get_packing_list_by_id(db, list_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "PackingList",
            id: list_id,
        })
}

/// Renames a list.
pub async fn rename_packing_list(
    db: &DatabaseConnection,
    list_id: i64,
    name: &str,
) -> Result<packing_list::Model> {
    let name = validate_list_name(name)?;
    let mut active_model: packing_list::ActiveModel = find_list(db, list_id).await?.into();
    active_model.name = Set(name);
    active_model.update(db).await.map_err(Into::into)
}

/// Assigns a live list to a packer, or clears the owner.
///
/// # Errors
/// - [`Error::Validation`] for templates, or when clearing the owner while several packers exist
/// - [`Error::NotFound`] for an unknown list or user
pub async fn set_list_owner(
    db: &DatabaseConnection,
    list_id: i64,
    owner: Option<i64>,
) -> Result<packing_list::Model> {
    let list = find_list(db, list_id).await?;
    if list.is_template {
        return Err(Error::validation("Templates have no owner"));
    }
    check_owner(db, owner).await?;

    let mut active_model: packing_list::ActiveModel = list.into();
    active_model.user_id = Set(owner);
    active_model.update(db).await.map_err(Into::into)
}

/// Turns the trip-length count rule of a template on or off.
///
/// # Errors
/// [`Error::Validation`] when the list is not a template.
pub async fn set_count_as_days(
    db: &DatabaseConnection,
    template_id: i64,
    count_as_days: bool,
) -> Result<packing_list::Model> {
    let list = find_list(db, template_id).await?;
    if !list.is_template {
        return Err(Error::validation(
            "Counting by days only applies to templates",
        ));
    }
    let mut active_model: packing_list::ActiveModel = list.into();
    active_model.count_as_days = Set(count_as_days);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes the given lists and all their items.
///
/// Meant to run inside the caller's transaction.
pub(crate) async fn delete_lists_cascade<C>(db: &C, list_ids: &[i64]) -> Result<u64>
where
    C: ConnectionTrait,
{
    if list_ids.is_empty() {
        return Ok(0);
    }

    let items = Item::delete_many()
        .filter(item::Column::PackingListId.is_in(list_ids.iter().copied()))
        .exec(db)
        .await?;
    let lists = PackingList::delete_many()
        .filter(packing_list::Column::Id.is_in(list_ids.iter().copied()))
        .exec(db)
        .await?;

    tracing::debug!(
        "Cascade removed {} lists and {} items",
        lists.rows_affected,
        items.rows_affected
    );
    Ok(lists.rows_affected)
}

/// Deletes a list and its items. Sibling lists keep their positions.
///
/// Returns `Ok(false)` when the list was already gone.
pub async fn delete_packing_list(db: &DatabaseConnection, list_id: i64) -> Result<bool> {
    let txn = db.begin().await?;
    let removed = delete_lists_cascade(&txn, &[list_id]).await?;
    txn.commit().await?;

    if removed == 0 {
        tracing::debug!("Packing list {} already deleted", list_id);
        return Ok(false);
    }
    tracing::info!("Deleted packing list {}", list_id);
    Ok(true)
}

/// Rewrites list positions inside one scope to follow `ordered_ids`.
///
/// Lists in other scopes of the same trip keep their positions.
///
/// # Arguments
/// * `db` - Database connection
/// * `scope` - Trip (or templates), list type, and day-of flag being reordered
/// * `ordered_ids` - Every list id of the scope, in the new order
///
/// # Errors
/// [`Error::Validation`] unless `ordered_ids` names every list of the scope exactly once.
pub async fn reorder_lists(
    db: &DatabaseConnection,
    scope: ListScope,
    ordered_ids: &[i64],
) -> Result<()> {
    let txn = db.begin().await?;

    let existing: Vec<i64> = PackingList::find()
        .select_only()
        .column(packing_list::Column::Id)
        .filter(scope.condition())
        .into_tuple()
        .all(&txn)
        .await?;
    ordering::validate_reorder(&existing, ordered_ids)?;

    for (position, id) in ordered_ids.iter().enumerate() {
        PackingList::update_many()
            .col_expr(
                packing_list::Column::SortOrder,
                Expr::value(i32::try_from(position)?),
            )
            .filter(packing_list::Column::Id.eq(*id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::features::FeatureFlags;
    use crate::core::item::get_items_for_list;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_packing_list_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_packing_list(&db, 1, "  ", ListType::Packing, false, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_packing_list_missing_trip() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_packing_list(&db, 42, "Clothes", ListType::Packing, false, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "Trip",
                id: 42
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_sort_order_per_scope() -> Result<()> {
        let (db, trip) = setup_with_trip().await?;

        let clothes = create_test_list(&db, trip.id, "Clothes", ListType::Packing).await?;
        let gear = create_test_list(&db, trip.id, "Gear", ListType::Packing).await?;
        let chores = create_test_list(&db, trip.id, "Chores", ListType::Task).await?;
        let grab = create_packing_list(&db, trip.id, "Grab", ListType::Packing, true, None).await?;

        assert_eq!(clothes.sort_order, 0);
        assert_eq!(gear.sort_order, 1);
        // Each (type, day-of) scope has its own sequence
        assert_eq!(chores.sort_order, 0);
        assert_eq!(grab.sort_order, 0);

        assert!(!clothes.is_template);
        assert_eq!(clothes.trip_id, Some(trip.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_owner_required_with_several_packers() -> Result<()> {
        let (db, trip) = setup_with_trip().await?;
        let plus = FeatureFlags::plus();
        let alex = crate::core::user::create_user(&db, &plus, "Alex", "#112233").await?;

        // One packer: owner optional
        create_test_list(&db, trip.id, "Clothes", ListType::Packing).await?;

        crate::core::user::create_user(&db, &plus, "Sam", "#445566").await?;
        let result =
            create_packing_list(&db, trip.id, "Gear", ListType::Packing, false, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let owned =
            create_packing_list(&db, trip.id, "Gear", ListType::Packing, false, Some(alex.id))
                .await?;
        assert_eq!(owned.user_id, Some(alex.id));

        let result =
            create_packing_list(&db, trip.id, "Gear", ListType::Packing, false, Some(999)).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_and_owner() -> Result<()> {
        let (db, _trip, list) = setup_with_list().await?;
        let alex = create_test_user(&db, "Alex").await?;

        let renamed = rename_packing_list(&db, list.id, " Warm clothes ").await?;
        assert_eq!(renamed.name, "Warm clothes");

        let owned = set_list_owner(&db, list.id, Some(alex.id)).await?;
        assert_eq!(owned.user_id, Some(alex.id));

        let result = rename_packing_list(&db, list.id, "").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_count_as_days_only_on_templates() -> Result<()> {
        let (db, _trip, list) = setup_with_list().await?;
        let template = create_template_list(&db, "Clothes", ListType::Packing, false, false).await?;

        let updated = set_count_as_days(&db, template.id, true).await?;
        assert!(updated.count_as_days);

        let result = set_count_as_days(&db, list.id, true).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_packing_list_cascades_items() -> Result<()> {
        let (db, trip, list) = setup_with_list().await?;
        let other = create_test_list(&db, trip.id, "Other", ListType::Packing).await?;
        create_test_item(&db, list.id, "Socks", 2).await?;
        create_test_item(&db, list.id, "Hat", 1).await?;
        let kept = create_test_item(&db, other.id, "Tent", 1).await?;

        assert!(delete_packing_list(&db, list.id).await?);
        assert!(get_packing_list_by_id(&db, list.id).await?.is_none());
        assert!(get_items_for_list(&db, list.id).await?.is_empty());
        let survivors = get_items_for_list(&db, other.id).await?;
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, kept.id);

        // Already gone
        assert!(!delete_packing_list(&db, list.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_lists() -> Result<()> {
        let (db, trip) = setup_with_trip().await?;
        let a = create_test_list(&db, trip.id, "A", ListType::Packing).await?;
        let b = create_test_list(&db, trip.id, "B", ListType::Packing).await?;
        let c = create_test_list(&db, trip.id, "C", ListType::Packing).await?;
        let chores = create_test_list(&db, trip.id, "Chores", ListType::Task).await?;
        let packing = ListScope::of(&a);

        // Task lists are not part of the packing scope
        reorder_lists(&db, packing, &[b.id, c.id, a.id]).await?;
        let names: Vec<String> = get_lists_for_trip(&db, trip.id)
            .await?
            .into_iter()
            .map(|list| list.name)
            .collect();
        assert_eq!(names, vec!["B", "C", "A", "Chores"]);

        let result = reorder_lists(&db, packing, &[a.id]).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = reorder_lists(&db, packing, &[a.id, b.id, c.id, chores.id]).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        let chores = get_packing_list_by_id(&db, chores.id).await?.unwrap();
        assert_eq!(chores.sort_order, 0);
        Ok(())
    }
}
