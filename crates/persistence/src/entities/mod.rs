//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod account;
pub mod comment;
pub mod session;
pub mod slide;
pub mod wish;

pub use account::AccountEntity;
pub use comment::CommentEntity;
pub use session::SessionEntity;
pub use slide::SlideEntity;
pub use wish::{MusicTypeDb, PrivacyDb, WishEntity, WishStatusDb};
