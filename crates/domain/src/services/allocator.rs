//! Identifier allocator.
//!
//! Maps a requested wish name to a unique public path of the form
//! `region/slug`, falling back to `region/vipN/slug` for premium accounts.

use rand::Rng;
use serde::Serialize;

use crate::error::{AllocationFailure, StoreError, WishError};
use crate::models::CallerIdentity;
use crate::services::store::WishStore;

/// Number of VIP slots available per region and slug.
pub const VIP_SLOT_COUNT: u8 = 10;

/// Result of a successful allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub path: String,
    pub vip_slot: Option<u8>,
}

/// Availability of a candidate path.
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub path: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

pub fn build_candidate_path(region: &str, slug: &str) -> String {
    format!("{}/{}", region, slug)
}

pub fn vip_path(region: &str, slot: u8, slug: &str) -> String {
    format!("{}/vip{}/{}", region, slot, slug)
}

/// Parses a `vipN` path segment, accepting only `vip1` through `vip10`.
pub fn parse_vip_slot(segment: &str) -> Option<u8> {
    let digits = segment.strip_prefix("vip")?;
    if digits.starts_with('0') {
        return None;
    }
    let slot: u8 = digits.parse().ok()?;
    (1..=VIP_SLOT_COUNT).contains(&slot).then_some(slot)
}

/// Proposes `slug-N` with a random `N` in `0..=9999`.
///
/// The suggestion is not checked for availability.
pub fn suggest_alternative(slug: &str) -> String {
    let n: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{}-{}", slug.trim_end_matches('-'), n)
}

/// Checks whether `path` is free, suggesting an alternative name if not.
pub async fn check_availability(
    store: &dyn WishStore,
    path: &str,
) -> Result<Availability, StoreError> {
    let taken = store.path_exists(path).await?;
    let suggestion = taken.then(|| {
        let slug = path.rsplit('/').next().unwrap_or(path);
        suggest_alternative(slug)
    });

    Ok(Availability {
        path: path.to_string(),
        available: !taken,
        suggestion,
    })
}

/// Finds the first free VIP slot for `slug` in `region`, trying slots in
/// ascending order. Returns `None` when all slots are taken.
pub async fn allocate_vip_slot(
    store: &dyn WishStore,
    region: &str,
    slug: &str,
) -> Result<Option<Allocation>, StoreError> {
    for slot in 1..=VIP_SLOT_COUNT {
        let path = vip_path(region, slot, slug);
        if !store.path_exists(&path).await? {
            return Ok(Some(Allocation {
                path,
                vip_slot: Some(slot),
            }));
        }
    }
    Ok(None)
}

/// Resolves the final path for a caller.
///
/// The standard path always wins when free. Otherwise premium callers get the
/// first free VIP slot and free callers are rejected with a suggestion.
pub async fn resolve_path(
    store: &dyn WishStore,
    caller: &CallerIdentity,
    slug: &str,
) -> Result<Allocation, WishError> {
    let standard = build_candidate_path(&caller.region, slug);
    if !store.path_exists(&standard).await? {
        return Ok(Allocation {
            path: standard,
            vip_slot: None,
        });
    }

    if !caller.is_premium {
        return Err(WishError::AllocationFailed(AllocationFailure::PathTaken {
            path: standard,
            suggestion: suggest_alternative(slug),
        }));
    }

    match allocate_vip_slot(store, &caller.region, slug).await? {
        Some(allocation) => {
            tracing::debug!(path = %allocation.path, "Standard path taken, using VIP slot");
            Ok(allocation)
        }
        None => Err(WishError::AllocationFailed(
            AllocationFailure::VipSlotsExhausted {
                slug: slug.to_string(),
            },
        )),
    }
}
