//! Shared utilities for the Best Wishes backend.
//!
//! This crate provides framework-free helpers used by every other crate:
//! - Slug normalization for shareable wish paths
//! - Password hashing with Argon2id (accounts and private wishes)
//! - JWT session tokens
//! - Common validation logic

pub mod jwt;
pub mod password;
pub mod slug;
pub mod validation;
