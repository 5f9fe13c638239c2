//! Template lists - copying templates into trips and live lists back into templates.
//!
//! Both directions are deep copies made inside one database transaction: either
//! the new list and all of its items exist afterwards, or nothing does. The
//! source list is only read.

use crate::{
    config::templates::Config,
    core::{
        item::{get_items_for_list, stored_count, validate_count, validate_item_name},
        ordering::{self, ListScope},
        packing_list::{
            check_owner, get_packing_list_by_id, insert_template, validate_list_name,
        },
        trip::get_trip_by_id,
    },
    entities::{ListType, PackingList, item, packing_list, trip},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};

/// A freshly created list and its items.
#[derive(Debug, Clone, PartialEq)]
pub struct CopiedList {
    /// The new list
    pub list: packing_list::Model,
    /// Its items, in order
    pub items: Vec<item::Model>,
}

/// Item fields carried over by a copy.
#[derive(Debug, Clone)]
struct NewItem {
    name: String,
    category: String,
    count: i32,
}

/// Count a materialized item starts with.
///
/// Templates that count by days use the trip length, or 1 when the trip has no
/// usable dates. Task list items are always 1.
#[must_use]
pub fn materialized_count(
    template: &packing_list::Model,
    trip: &trip::Model,
    template_count: i32,
) -> i32 {
    let count = if template.count_as_days {
        trip.duration_days()
            .and_then(|days| i32::try_from(days).ok())
            .unwrap_or(1)
    } else {
        template_count
    };
    stored_count(template.list_type(), count.max(1))
}

/// Inserts copies at the end of a list, keeping the given order.
async fn insert_items<C>(
    db: &C,
    packing_list_id: i64,
    new_items: Vec<NewItem>,
) -> Result<Vec<item::Model>>
where
    C: ConnectionTrait,
{
    let mut sort_order = ordering::next_item_sort_order(db, packing_list_id).await?;
    let mut unified_sort_order = ordering::next_unified_sort_order(db).await?;
    let now = chrono::Utc::now();

    let mut created = Vec::with_capacity(new_items.len());
    for new_item in new_items {
        let model = item::ActiveModel {
            packing_list_id: Set(packing_list_id),
            name: Set(new_item.name),
            category: Set(new_item.category),
            count: Set(new_item.count),
            is_packed: Set(false),
            sort_order: Set(sort_order),
            unified_sort_order: Set(unified_sort_order),
            created_at: Set(now),
            ..Default::default()
        };
        created.push(model.insert(db).await?);
        sort_order += 1;
        unified_sort_order += 1;
    }
    Ok(created)
}

/// Retrieves all templates grouped by type and day-of flag, each group in `sort_order`.
pub async fn get_templates(db: &DatabaseConnection) -> Result<Vec<packing_list::Model>> {
    PackingList::find()
        .filter(packing_list::Column::IsTemplate.eq(true))
        .order_by_asc(packing_list::Column::ListType)
        .order_by_asc(packing_list::Column::IsDayOf)
        .order_by_asc(packing_list::Column::SortOrder)
        .order_by_asc(packing_list::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Copies a template into a trip as a new, unpacked live list.
///
/// The new list keeps the template's name, type, day-of and count-as-days flags
/// and goes after the trip's lists of the same type and day-of flag. Every item
/// is copied unpacked; see [`materialized_count`] for counts.
///
/// # Errors
/// - [`Error::NotFound`] for a missing template, trip, or owner
/// - [`Error::Validation`] when the source is not a template, or an owner is
///   required but missing
///
/// # Arguments
/// * `db` - Database connection
/// * `template_id` - Template to copy from
/// * `trip_id` - Trip that receives the new list
/// * `owner` - Packer who owns the new list, if any
///
/// # Returns
/// The new list and its items. Nothing is written when an error is returned.
pub async fn materialize_template(
    db: &DatabaseConnection,
    template_id: i64,
    trip_id: i64,
    owner: Option<i64>,
) -> Result<CopiedList> {
    let txn = db.begin().await?;

    let template = get_packing_list_by_id(&txn, template_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "PackingList",
            id: template_id,
        })?;
    if !template.is_template {
        return Err(Error::validation(format!(
            "List {template_id} is not a template"
        )));
    }
    let trip = get_trip_by_id(&txn, trip_id).await?.ok_or(Error::NotFound {
        entity: "Trip",
        id: trip_id,
    })?;
    check_owner(&txn, owner).await?;

    let (list_type, is_day_of) = template.kind();
    let sort_order = ordering::next_list_sort_order(
        &txn,
        ListScope {
            trip_id: Some(trip.id),
            list_type,
            is_day_of,
        },
    )
    .await?;

    let list = packing_list::ActiveModel {
        name: Set(template.name.clone()),
        list_type: Set(list_type.as_str().to_string()),
        is_template: Set(false),
        is_day_of: Set(is_day_of),
        count_as_days: Set(template.count_as_days),
        sort_order: Set(sort_order),
        created_at: Set(chrono::Utc::now()),
        user_id: Set(owner),
        trip_id: Set(Some(trip.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let new_items = get_items_for_list(&txn, template.id)
        .await?
        .into_iter()
        .map(|source| NewItem {
            count: materialized_count(&template, &trip, source.count),
            name: source.name,
            category: source.category,
        })
        .collect();
    let items = insert_items(&txn, list.id, new_items).await?;

    txn.commit().await?;

    tracing::info!(
        "Materialized template '{}' into trip {} with {} items",
        template.name,
        trip.id,
        items.len()
    );
    Ok(CopiedList { list, items })
}

/// Saves a live list as a new template.
///
/// Items keep their names, categories, and counts and start unpacked. The new
/// template does not count by days. `name` overrides the list's name.
///
/// # Errors
/// - [`Error::NotFound`] for a missing list
/// - [`Error::Validation`] when the list is already a template or `name` is blank
pub async fn save_as_template(
    db: &DatabaseConnection,
    list_id: i64,
    name: Option<&str>,
) -> Result<CopiedList> {
    let name = name.map(validate_list_name).transpose()?;

    let txn = db.begin().await?;

    let source = get_packing_list_by_id(&txn, list_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "PackingList",
            id: list_id,
        })?;
    if source.is_template {
        return Err(Error::validation(format!(
            "List {list_id} is already a template"
        )));
    }

    let (list_type, is_day_of) = source.kind();
    let template = insert_template(
        &txn,
        name.unwrap_or_else(|| source.name.clone()),
        list_type,
        is_day_of,
        false,
    )
    .await?;

    let new_items = get_items_for_list(&txn, source.id)
        .await?
        .into_iter()
        .map(|it| NewItem {
            name: it.name,
            category: it.category,
            count: stored_count(list_type, it.count.max(1)),
        })
        .collect();
    let items = insert_items(&txn, template.id, new_items).await?;

    txn.commit().await?;

    tracing::info!(
        "Saved list {} as template '{}' ({})",
        list_id,
        template.name,
        template.id
    );
    Ok(CopiedList {
        list: template,
        items,
    })
}

/// Creates the configured templates when the database has none yet.
///
/// Invalid entries, including unknown list types, abort the whole seed without
/// writing anything.
///
/// # Arguments
/// * `db` - Database connection
/// * `config` - Parsed `templates.toml`
///
/// # Returns
/// * `Ok(0)` - Templates already exist, nothing was seeded
/// * `Ok(n)` - Number of templates created
pub async fn seed_default_templates(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let existing = PackingList::find()
        .filter(packing_list::Column::IsTemplate.eq(true))
        .count(db)
        .await?;
    if existing > 0 {
        tracing::debug!("{} templates present, skipping seed", existing);
        return Ok(0);
    }

    let txn = db.begin().await?;

    for entry in &config.templates {
        let name = validate_list_name(&entry.name)?;
        let (list_type, legacy_day_of) = ListType::parse(&entry.list_type).ok_or_else(|| {
            Error::validation(format!(
                "Template '{}' has unknown list type {:?}",
                entry.name, entry.list_type
            ))
        })?;
        let new_items = entry
            .items
            .iter()
            .map(|it| {
                Ok(NewItem {
                    name: validate_item_name(&it.name)?,
                    category: it.category.trim().to_string(),
                    count: stored_count(list_type, validate_count(it.count)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let template = insert_template(
            &txn,
            name,
            list_type,
            entry.is_day_of || legacy_day_of,
            entry.count_as_days,
        )
        .await?;
        insert_items(&txn, template.id, new_items).await?;
    }

    txn.commit().await?;

    tracing::info!("Seeded {} default templates", config.templates.len());
    Ok(config.templates.len())
}
