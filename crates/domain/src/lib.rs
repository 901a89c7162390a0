//! Domain layer for the Best Wishes backend.
//!
//! This crate contains:
//! - Domain models (Wish, Slide, Comment, Account) and the cosmetic catalog
//! - The wish lifecycle state machine and the access gate
//! - The identifier allocator and the publication orchestrator
//! - Collaborator traits for storage and blob upload
//! - The domain error taxonomy

pub mod error;
pub mod models;
pub mod services;

pub use error::{AllocationFailure, StoreError, WishError};
