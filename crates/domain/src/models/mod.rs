//! Domain models for Best Wishes.

pub mod account;
pub mod catalog;
pub mod comment;
pub mod slide;
pub mod wish;

pub use account::{Account, CallerIdentity};
pub use comment::{Comment, CreateCommentRequest, NewComment};
pub use slide::{NewSlide, Slide};
pub use wish::{MusicType, NewWish, Privacy, Wish, WishStatus, WishSummary, WishView};
