//! Item business logic - Handles all item-related operations.
//!
//! Items are created at the end of their list, edited in place, checked off,
//! and deleted without renumbering their siblings. Counts only matter on packing
//! lists; task list items always count once.

use crate::{
    core::{ordering, packing_list::get_packing_list_by_id},
    entities::{Item, ListType, PackingList, item, packing_list},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Validates an item name, returning it trimmed.
pub(crate) fn validate_item_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Item name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Validates a requested count.
pub(crate) fn validate_count(count: i32) -> Result<i32> {
    if count < 1 {
        return Err(Error::validation(format!(
            "Item count must be at least 1, got {count}"
        )));
    }
    Ok(count)
}

/// Count stored for an item on a list of the given type.
pub(crate) const fn stored_count(list_type: ListType, count: i32) -> i32 {
    match list_type {
        ListType::Packing => count,
        ListType::Task => 1,
    }
}

/// Retrieves a specific item by its unique ID.
pub async fn get_item_by_id(db: &DatabaseConnection, item_id: i64) -> Result<Option<item::Model>> {
    Item::find_by_id(item_id).one(db).await.map_err(Into::into)
}

/// Retrieves all items of a list in display order.
pub async fn get_items_for_list<C>(db: &C, packing_list_id: i64) -> Result<Vec<item::Model>>
where
    C: ConnectionTrait,
{
    Item::find()
        .filter(item::Column::PackingListId.eq(packing_list_id))
        .order_by_asc(item::Column::SortOrder)
        .order_by_asc(item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every item of a trip in cross-list (`unified_sort_order`) order.
pub async fn get_trip_items_unified(
    db: &DatabaseConnection,
    trip_id: i64,
) -> Result<Vec<item::Model>> {
    Item::find()
        .inner_join(PackingList)
        .filter(packing_list::Column::TripId.eq(trip_id))
        .order_by_asc(item::Column::UnifiedSortOrder)
        .order_by_asc(item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds an item to the end of a list.
///
/// The name is trimmed and must not be empty; the count must be at least 1.
/// Items on task lists are stored with a count of 1 whatever was requested.
///
/// # Arguments
/// * `db` - Database connection
/// * `packing_list_id` - List that receives the item
/// * `name` - What to pack or do
/// * `category` - Informational category, may be empty
/// * `count` - How many to pack
///
/// # Errors
/// - [`Error::Validation`] for an empty name or a count below 1
/// - [`Error::NotFound`] when the list does not exist
pub async fn create_item(
    db: &DatabaseConnection,
    packing_list_id: i64,
    name: &str,
    category: &str,
    count: i32,
) -> Result<item::Model> {
    let name = validate_item_name(name)?;
    let count = validate_count(count)?;

    let list = get_packing_list_by_id(db, packing_list_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "PackingList",
            id: packing_list_id,
        })?;

    let sort_order = ordering::next_item_sort_order(db, list.id).await?;
    let unified_sort_order = ordering::next_unified_sort_order(db).await?;

    let item = item::ActiveModel {
        packing_list_id: Set(list.id),
        name: Set(name),
        category: Set(category.trim().to_string()),
        count: Set(stored_count(list.list_type(), count)),
        is_packed: Set(false),
        sort_order: Set(sort_order),
        unified_sort_order: Set(unified_sort_order),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = item.insert(db).await?;
    tracing::debug!("Created item {} on list {}", result.id, list.id);
    Ok(result)
}

async fn find_item(db: &DatabaseConnection, item_id: i64) -> Result<item::Model> {
    get_item_by_id(db, item_id).await?.ok_or(Error::NotFound {
        entity: "Item",
        id: item_id,
    })
}

/// Edits an item's name, category, and count.
///
/// # Errors
/// - [`Error::Validation`] for an empty name or a count below 1
/// - [`Error::NotFound`] when the item does not exist
pub async fn update_item(
    db: &DatabaseConnection,
    item_id: i64,
    name: &str,
    category: &str,
    count: i32,
) -> Result<item::Model> {
    let name = validate_item_name(name)?;
    let count = validate_count(count)?;

    let existing = find_item(db, item_id).await?;
    let list_type = get_packing_list_by_id(db, existing.packing_list_id)
        .await?
        .map_or(ListType::Packing, |list| list.list_type());

    let mut active_model: item::ActiveModel = existing.into();
    active_model.name = Set(name);
    active_model.category = Set(category.trim().to_string());
    active_model.count = Set(stored_count(list_type, count));
    active_model.update(db).await.map_err(Into::into)
}

/// Marks an item as packed or unpacked.
pub async fn set_item_packed(
    db: &DatabaseConnection,
    item_id: i64,
    is_packed: bool,
) -> Result<item::Model> {
    let mut active_model: item::ActiveModel = find_item(db, item_id).await?.into();
    active_model.is_packed = Set(is_packed);
    active_model.update(db).await.map_err(Into::into)
}

/// Flips an item's packed state.
pub async fn toggle_item_packed(db: &DatabaseConnection, item_id: i64) -> Result<item::Model> {
    let existing = find_item(db, item_id).await?;
    let is_packed = !existing.is_packed;
    let mut active_model: item::ActiveModel = existing.into();
    active_model.is_packed = Set(is_packed);
    active_model.update(db).await.map_err(Into::into)
}

/// Marks every item on a list as packed or unpacked, returning how many rows changed.
pub async fn set_all_items_packed(
    db: &DatabaseConnection,
    packing_list_id: i64,
    is_packed: bool,
) -> Result<u64> {
    let result = Item::update_many()
        .col_expr(item::Column::IsPacked, Expr::value(is_packed))
        .filter(item::Column::PackingListId.eq(packing_list_id))
        .filter(item::Column::IsPacked.ne(is_packed))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Deletes an item. Siblings keep their positions.
///
/// Returns `Ok(false)` when the item was already gone.
pub async fn delete_item(db: &DatabaseConnection, item_id: i64) -> Result<bool> {
    let result = Item::delete_by_id(item_id).exec(db).await?;
    if result.rows_affected == 0 {
        tracing::debug!("Item {} already deleted", item_id);
        return Ok(false);
    }
    Ok(true)
}

/// Rewrites item positions of a list to follow `ordered_ids`.
///
/// # Errors
/// [`Error::Validation`] unless `ordered_ids` names every item of the list exactly once.
pub async fn reorder_items(
    db: &DatabaseConnection,
    packing_list_id: i64,
    ordered_ids: &[i64],
) -> Result<()> {
    let txn = db.begin().await?;

    let existing: Vec<i64> = get_items_for_list(&txn, packing_list_id)
        .await?
        .into_iter()
        .map(|it| it.id)
        .collect();
    ordering::validate_reorder(&existing, ordered_ids)?;

    for (position, id) in ordered_ids.iter().enumerate() {
        Item::update_many()
            .col_expr(item::Column::SortOrder, Expr::value(i32::try_from(position)?))
            .filter(item::Column::Id.eq(*id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(())
}
