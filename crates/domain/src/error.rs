//! Domain error taxonomy.
//!
//! Collaborator failures are translated into these variants at the boundary
//! of each component; gate and lifecycle code never sees raw store errors.

use thiserror::Error;

/// Why a path could not be allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationFailure {
    /// Standard path is taken and the caller has no VIP fallback.
    PathTaken { path: String, suggestion: String },
    /// All ten VIP slots are occupied for this slug.
    VipSlotsExhausted { slug: String },
    /// Concurrent publishers kept winning the race for the path.
    Contended { path: String },
}

/// Errors surfaced by domain operations.
#[derive(Debug, Error)]
pub enum WishError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{}", allocation_message(.0))]
    AllocationFailed(AllocationFailure),

    #[error("Incorrect password")]
    AccessDenied,

    #[error("Wish not found")]
    NotFound,

    #[error("This wish has expired")]
    Expired,

    #[error("Only the owner can do this")]
    NotOwner,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Storage error: {0}")]
    Store(String),
}

fn allocation_message(failure: &AllocationFailure) -> String {
    match failure {
        AllocationFailure::PathTaken { path, suggestion } => format!(
            "The URL {} is already taken. Try: {}",
            path, suggestion
        ),
        AllocationFailure::VipSlotsExhausted { .. } => {
            "All VIP slots are taken. Please try a different name.".to_string()
        }
        AllocationFailure::Contended { path } => format!(
            "The URL {} was claimed by someone else while publishing. Please try again.",
            path
        ),
    }
}

/// Errors reported by storage collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The unique constraint on `custom_url` rejected the insert.
    #[error("Path already claimed: {0}")]
    PathConflict(String),

    #[error("Record not found")]
    NotFound,

    #[error("{0}")]
    Backend(String),
}

impl From<StoreError> for WishError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => WishError::NotFound,
            StoreError::PathConflict(path) => {
                WishError::AllocationFailed(AllocationFailure::Contended { path })
            }
            StoreError::Backend(msg) => WishError::Store(msg),
        }
    }
}
