//! Application services wired into the HTTP layer.

pub mod auth;
pub mod blob_store;
pub mod comment_feed;

pub use auth::{AuthError, AuthResult, AuthService};
pub use blob_store::LocalBlobStore;
pub use comment_feed::CommentFeed;
