//! Wish lifecycle state machine.
//!
//! `scheduled -> active` happens inside [`WishStore::record_view`] together
//! with the view count. Expiry is an explicit owner action and is terminal.

use uuid::Uuid;

use crate::error::WishError;
use crate::models::{Wish, WishStatus};
use crate::services::store::WishStore;

/// Returns true if a wish may move from `from` to `to`.
pub fn can_transition(from: WishStatus, to: WishStatus) -> bool {
    use WishStatus::*;
    matches!(
        (from, to),
        (Draft, Scheduled) | (Scheduled, Active) | (Draft | Scheduled | Active, Expired)
    )
}

/// Expires a wish on behalf of its owner.
///
/// Expiring an already expired wish is a no-op.
pub async fn expire_wish(
    store: &dyn WishStore,
    wish_id: Uuid,
    owner_id: Uuid,
) -> Result<Wish, WishError> {
    let wish = store.find_by_id(wish_id).await?.ok_or(WishError::NotFound)?;
    if !wish.is_owned_by(owner_id) {
        return Err(WishError::NotOwner);
    }
    if wish.status == WishStatus::Expired {
        return Ok(wish);
    }
    if !can_transition(wish.status, WishStatus::Expired) {
        return Err(WishError::InvalidTransition {
            from: wish.status.to_string(),
            to: WishStatus::Expired.to_string(),
        });
    }

    let expired = store
        .mark_expired(wish_id)
        .await?
        .ok_or(WishError::NotFound)?;
    tracing::info!(wish_id = %wish_id, "Wish expired by owner");
    Ok(expired)
}
