//! Ordering discipline for lists and items.
//!
//! Positions are explicit integers. A new record goes after the current maximum
//! of its scope, deletions leave gaps, and readers sort ascending. Gaps are harmless.

use crate::{
    entities::{Item, ListType, PackingList, item, packing_list, packing_list::LEGACY_DAY_OF},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, prelude::*};
use std::collections::HashSet;

/// The set of lists that share one `sort_order` sequence.
///
/// Live lists are scoped by trip, type, and day-of flag. Templates use the same
/// type and day-of split but have no trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListScope {
    /// Owning trip, or `None` for templates
    pub trip_id: Option<i64>,
    /// List type
    pub list_type: ListType,
    /// Day-of flag
    pub is_day_of: bool,
}

impl ListScope {
    /// Scope of an existing list.
    #[must_use]
    pub fn of(list: &packing_list::Model) -> Self {
        let (list_type, is_day_of) = list.kind();
        Self {
            trip_id: list.trip_id,
            list_type,
            is_day_of,
        }
    }

    /// Filter selecting the lists in this scope.
    ///
    /// Rows still stored with the legacy `"Day-of"` type belong to the day-of
    /// packing scope, so positions stay unique before the migration has run.
    pub(crate) fn condition(&self) -> Condition {
        let trip = match self.trip_id {
            Some(trip_id) => packing_list::Column::TripId.eq(trip_id),
            None => packing_list::Column::TripId.is_null(),
        };
        let current = Condition::all()
            .add(packing_list::Column::ListType.eq(self.list_type.as_str()))
            .add(packing_list::Column::IsDayOf.eq(self.is_day_of));
        let kind = if self.list_type == ListType::Packing && self.is_day_of {
            Condition::any()
                .add(current)
                .add(packing_list::Column::ListType.eq(LEGACY_DAY_OF))
        } else {
            current
        };
        Condition::all()
            .add(trip)
            .add(packing_list::Column::IsTemplate.eq(self.trip_id.is_none()))
            .add(kind)
    }
}

/// Next free `sort_order` for a list in `scope`.
pub async fn next_list_sort_order<C>(db: &C, scope: ListScope) -> Result<i32>
where
    C: ConnectionTrait,
{
    let last = PackingList::find()
        .filter(scope.condition())
        .order_by_desc(packing_list::Column::SortOrder)
        .one(db)
        .await?;
    Ok(last.map_or(0, |list| list.sort_order + 1))
}

/// Next free `sort_order` for an item in the given list.
pub async fn next_item_sort_order<C>(db: &C, packing_list_id: i64) -> Result<i32>
where
    C: ConnectionTrait,
{
    let last = Item::find()
        .filter(item::Column::PackingListId.eq(packing_list_id))
        .order_by_desc(item::Column::SortOrder)
        .one(db)
        .await?;
    Ok(last.map_or(0, |it| it.sort_order + 1))
}

/// Next free `unified_sort_order` across all items.
pub async fn next_unified_sort_order<C>(db: &C) -> Result<i32>
where
    C: ConnectionTrait,
{
    let last = Item::find()
        .order_by_desc(item::Column::UnifiedSortOrder)
        .one(db)
        .await?;
    Ok(last.map_or(0, |it| it.unified_sort_order + 1))
}

/// Assigns `0..n` to records ordered by creation time, ties broken by id.
///
/// Input is `(id, created_at)`; output is `(id, position)` in position order.
pub fn sequential_orders(records: &[(i64, DateTimeUtc)]) -> Result<Vec<(i64, i32)>> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|&(id, created_at)| (created_at, id));
    sorted
        .into_iter()
        .enumerate()
        .map(|(position, (id, _))| Ok((id, i32::try_from(position)?)))
        .collect()
}

/// Checks that `ordered_ids` is a permutation of `existing_ids`.
///
/// # Errors
/// Returns [`Error::Validation`] for duplicates, foreign ids, or missing ids.
pub fn validate_reorder(existing_ids: &[i64], ordered_ids: &[i64]) -> Result<()> {
    let existing: HashSet<i64> = existing_ids.iter().copied().collect();
    let mut seen = HashSet::with_capacity(ordered_ids.len());

    for id in ordered_ids {
        if !existing.contains(id) {
            return Err(Error::validation(format!(
                "Id {id} does not belong to this collection"
            )));
        }
        if !seen.insert(*id) {
            return Err(Error::validation(format!("Id {id} appears more than once")));
        }
    }

    if seen.len() != existing.len() {
        return Err(Error::validation(
            "Reorder must include every member of the collection",
        ));
    }
    Ok(())
}
