//! Packing progress aggregation.
//!
//! A [`TripSnapshot`] is loaded once; everything else in this module is a pure
//! function of that snapshot. Progress with nothing to count is "hidden"
//! ([`Progress::ratio`] returns `None`) rather than a division by zero.

use crate::{
    core::{item::get_items_for_list, packing_list::get_lists_for_trip, trip::get_trip_by_id},
    entities::{ListType, item, packing_list, trip},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;

/// Completed and total item weight for some set of lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Weight of packed items
    pub completed: i64,
    /// Weight of all items
    pub total: i64,
}

impl Progress {
    /// Fraction packed in `0.0..=1.0`, or `None` when there is nothing to pack.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| self.completed as f64 / self.total as f64)
    }

    /// Whether there is anything to show.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.total == 0
    }

    /// Whether every counted item is packed. Hidden progress is never complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    /// Adds another progress pair to this one.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            completed: self.completed + other.completed,
            total: self.total + other.total,
        }
    }
}

/// A list together with its items, both in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ListWithItems {
    /// The list
    pub list: packing_list::Model,
    /// Its items
    pub items: Vec<item::Model>,
}

impl ListWithItems {
    /// Progress of this list alone.
    #[must_use]
    pub fn progress(&self) -> Progress {
        per_list_progress(&self.list, &self.items)
    }
}

/// A trip with all its live lists and their items.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSnapshot {
    /// The trip
    pub trip: trip::Model,
    /// Its lists, grouped by type and day-of flag, each group in `sort_order`
    pub lists: Vec<ListWithItems>,
}

impl TripSnapshot {
    /// Narrows the snapshot to the lists one packer owns.
    #[must_use]
    pub fn for_packer(&self, user_id: i64) -> Self {
        Self {
            trip: self.trip.clone(),
            lists: self
                .lists
                .iter()
                .filter(|entry| entry.list.user_id == Some(user_id))
                .cloned()
                .collect(),
        }
    }

    fn matching(&self, list_type: ListType, is_day_of: bool) -> impl Iterator<Item = &ListWithItems> {
        self.lists
            .iter()
            .filter(move |entry| entry.list.kind() == (list_type, is_day_of))
    }
}

/// Loads a trip and everything needed to aggregate its progress.
///
/// # Errors
/// [`Error::NotFound`] when the trip does not exist.
pub async fn load_trip_snapshot(db: &DatabaseConnection, trip_id: i64) -> Result<TripSnapshot> {
    let trip = get_trip_by_id(db, trip_id).await?.ok_or(Error::NotFound {
        entity: "Trip",
        id: trip_id,
    })?;

    let mut lists = Vec::new();
    for list in get_lists_for_trip(db, trip_id).await? {
        let items = get_items_for_list(db, list.id).await?;
        lists.push(ListWithItems { list, items });
    }

    Ok(TripSnapshot { trip, lists })
}

/// Progress of one list.
#[must_use]
pub fn per_list_progress(list: &packing_list::Model, items: &[item::Model]) -> Progress {
    let list_type = list.list_type();
    items.iter().fold(Progress::default(), |acc, it| {
        let weight = list_type.item_weight(it.count);
        Progress {
            completed: acc.completed + if it.is_packed { weight } else { 0 },
            total: acc.total + weight,
        }
    })
}

/// Total item weight over the trip's lists of the given type and day-of flag.
///
/// Packing items weigh their count; task items weigh 1.
#[must_use]
pub fn total_items(snapshot: &TripSnapshot, list_type: ListType, is_day_of: bool) -> i64 {
    list_progress(snapshot, list_type, is_day_of).total
}

/// Packed item weight over the trip's lists of the given type and day-of flag.
#[must_use]
pub fn completed_items(snapshot: &TripSnapshot, list_type: ListType, is_day_of: bool) -> i64 {
    list_progress(snapshot, list_type, is_day_of).completed
}

/// Progress over the trip's lists of the given type and day-of flag.
#[must_use]
pub fn list_progress(snapshot: &TripSnapshot, list_type: ListType, is_day_of: bool) -> Progress {
    snapshot
        .matching(list_type, is_day_of)
        .map(ListWithItems::progress)
        .fold(Progress::default(), Progress::merge)
}

/// Combined progress of every day-of list, packing and task alike.
#[must_use]
pub fn day_of_progress(snapshot: &TripSnapshot) -> Progress {
    ListType::ALL
        .iter()
        .map(|&list_type| list_progress(snapshot, list_type, true))
        .fold(Progress::default(), Progress::merge)
}

/// Progress figures for everything shown on a trip's overview.
#[derive(Debug, Clone, PartialEq)]
pub struct TripReport {
    /// The trip
    pub trip: trip::Model,
    /// Regular packing lists
    pub packing: Progress,
    /// Regular task lists
    pub tasks: Progress,
    /// Day-of packing lists
    pub day_of_packing: Progress,
    /// Day-of task lists
    pub day_of_tasks: Progress,
    /// Day-of packing and tasks combined
    pub day_of: Progress,
    /// Each list with its own progress, in display order
    pub lists: Vec<(packing_list::Model, Progress)>,
}

/// Builds a report from an already loaded snapshot.
#[must_use]
pub fn build_trip_report(snapshot: &TripSnapshot) -> TripReport {
    TripReport {
        trip: snapshot.trip.clone(),
        packing: list_progress(snapshot, ListType::Packing, false),
        tasks: list_progress(snapshot, ListType::Task, false),
        day_of_packing: list_progress(snapshot, ListType::Packing, true),
        day_of_tasks: list_progress(snapshot, ListType::Task, true),
        day_of: day_of_progress(snapshot),
        lists: snapshot
            .lists
            .iter()
            .map(|entry| (entry.list.clone(), entry.progress()))
            .collect(),
    }
}

/// Loads a trip and reports its progress.
///
/// # Arguments
/// * `db` - Database connection
/// * `trip_id` - Trip to report on
///
/// # Returns
/// A [`TripReport`] with the four type/day-of partitions, the day-of rollup,
/// and one entry per list in display order.
///
/// # Errors
/// [`Error::NotFound`] when the trip does not exist.
pub async fn generate_trip_report(db: &DatabaseConnection, trip_id: i64) -> Result<TripReport> {
    let snapshot = load_trip_snapshot(db, trip_id).await?;
    Ok(build_trip_report(&snapshot))
}

/// Renders progress as a text bar like `[████░░░░░░] 4/10`.
///
/// # Arguments
/// * `progress` - Completed and total weight
/// * `bar_length` - Number of bar characters (default: 10)
///
/// # Returns
/// * `Some(bar)` - The rendered bar followed by `completed/total`
/// * `None` - Progress is hidden, so no indicator should be shown
#[must_use]
pub fn format_progress_bar(progress: &Progress, bar_length: Option<usize>) -> Option<String> {
    let ratio = progress.ratio()?;
    let length = bar_length.unwrap_or(10);

    // Cast safety: ratio ∈ [0, 1] and length is small, so the product fits in usize.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = (ratio.clamp(0.0, 1.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    Some(format!(
        "[{}{}] {}/{}",
        "█".repeat(filled),
        "░".repeat(empty),
        progress.completed,
        progress.total
    ))
}
