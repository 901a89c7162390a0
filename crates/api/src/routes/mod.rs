//! HTTP route handlers.

pub mod auth;
pub mod catalog;
pub mod comments;
pub mod health;
pub mod visitor;
pub mod wishes;
