//! User business logic - packers and their owned lists.
//!
//! The free tier supports a single packer; additional packers need plus.
//! Deleting a packer deletes every list it owns along with those lists' items.

use crate::{
    config::features::FeatureFlags,
    core::packing_list::delete_lists_cascade,
    entities::{PackingList, User, packing_list, user},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};

/// Validates a `#RRGGBB` color tag, returning it uppercased.
pub(crate) fn validate_color_tag(color_tag: &str) -> Result<String> {
    let tag = color_tag.trim();
    let valid = tag.len() == 7
        && tag.starts_with('#')
        && tag[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(Error::validation(format!(
            "Color tag must look like #RRGGBB, got {color_tag:?}"
        )));
    }
    Ok(tag.to_ascii_uppercase())
}

fn validate_user_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("User name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Retrieves all users in creation order.
pub async fn get_all_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::CreatedAt)
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by its unique ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Creates a packer.
///
/// # Errors
/// - [`Error::Validation`] for an empty name or malformed color tag
/// - [`Error::PlusRequired`] when a packer already exists and plus is locked
pub async fn create_user(
    db: &DatabaseConnection,
    features: &FeatureFlags,
    name: &str,
    color_tag: &str,
) -> Result<user::Model> {
    let name = validate_user_name(name)?;
    let color_tag = validate_color_tag(color_tag)?;

    if !features.has_unlocked_plus() && User::find().count(db).await? > 0 {
        return Err(Error::PlusRequired {
            feature: "multiple packers",
        });
    }

    let user = user::ActiveModel {
        name: Set(name),
        color_tag: Set(color_tag),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user.insert(db).await?;
    tracing::info!("Created packer '{}' ({})", result.name, result.id);
    Ok(result)
}

/// Changes a packer's name and color.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
    color_tag: &str,
) -> Result<user::Model> {
    let name = validate_user_name(name)?;
    let color_tag = validate_color_tag(color_tag)?;

    let mut active_model: user::ActiveModel = get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "User",
            id: user_id,
        })?
        .into();
    active_model.name = Set(name);
    active_model.color_tag = Set(color_tag);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a packer together with every list it owns and their items.
///
/// Runs in one transaction.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Packer to delete
///
/// # Returns
/// * `Ok(true)` - The packer and its lists were deleted
/// * `Ok(false)` - The packer was already gone
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<bool> {
    let txn = db.begin().await?;

    let Some(user) = User::find_by_id(user_id).one(&txn).await? else {
        tracing::debug!("User {} already deleted", user_id);
        return Ok(false);
    };

    let owned: Vec<i64> = PackingList::find()
        .select_only()
        .column(packing_list::Column::Id)
        .filter(packing_list::Column::UserId.eq(user_id))
        .into_tuple()
        .all(&txn)
        .await?;

    let removed_lists = delete_lists_cascade(&txn, &owned).await?;
    user.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!("Deleted packer {} and {} owned lists", user_id, removed_lists);
    Ok(true)
}
