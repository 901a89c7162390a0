//! Repository implementations for database operations.

pub mod account;
pub mod comment;
pub mod session;
pub mod slide;
pub mod wish;

pub use account::AccountRepository;
pub use comment::CommentRepository;
pub use session::SessionRepository;
pub use slide::SlideRepository;
pub use wish::{NewWishRow, WishRepository};
