//! Comment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Maximum length of a comment message.
pub const MAX_COMMENT_CHARS: u64 = 500;

/// A visitor comment attached to a wish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub wish_id: Uuid,
    /// `None` for guests.
    pub author_id: Option<Uuid>,
    pub display_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for posting a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    /// Required for guests; signed-in visitors default to their username.
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub display_name: Option<String>,

    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment must be between 1 and 500 characters"
    ))]
    pub message: String,
}

/// Values for a comment row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub wish_id: Uuid,
    pub author_id: Option<Uuid>,
    pub display_name: String,
    pub message: String,
}

impl NewComment {
    /// Builds a comment from a request, resolving the display name.
    ///
    /// Returns `None` when a guest did not give a usable name or the trimmed
    /// message is empty.
    pub fn from_request(
        wish_id: Uuid,
        request: CreateCommentRequest,
        author: Option<(Uuid, &str)>,
    ) -> Option<Self> {
        let message = request.message.trim().to_string();
        if message.is_empty() {
            return None;
        }

        let requested_name = request
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let (author_id, display_name) = match author {
            Some((id, username)) => (Some(id), requested_name.unwrap_or(username).to_string()),
            None => (None, requested_name?.to_string()),
        };

        Some(Self {
            wish_id,
            author_id,
            display_name,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: Option<&str>, message: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            display_name: name.map(String::from),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_validation_limits() {
        assert!(request(Some("Ana"), "Happy birthday!").validate().is_ok());
        assert!(request(Some("Ana"), "").validate().is_err());
        assert!(request(Some("Ana"), &"x".repeat(501)).validate().is_err());
        assert!(request(Some("Ana"), &"x".repeat(500)).validate().is_ok());
        assert!(request(Some(&"n".repeat(51)), "hi").validate().is_err());
    }

    #[test]
    fn test_guest_needs_name() {
        let wish_id = Uuid::new_v4();
        assert!(NewComment::from_request(wish_id, request(None, "hi"), None).is_none());
        assert!(NewComment::from_request(wish_id, request(Some("   "), "hi"), None).is_none());

        let comment = NewComment::from_request(wish_id, request(Some(" Ana "), "hi"), None).unwrap();
        assert_eq!(comment.display_name, "Ana");
        assert!(comment.author_id.is_none());
    }

    #[test]
    fn test_member_defaults_to_username() {
        let wish_id = Uuid::new_v4();
        let author = Uuid::new_v4();
        let comment =
            NewComment::from_request(wish_id, request(None, " hi "), Some((author, "sam"))).unwrap();
        assert_eq!(comment.display_name, "sam");
        assert_eq!(comment.author_id, Some(author));
        assert_eq!(comment.message, "hi");
    }

    #[test]
    fn test_blank_message_rejected() {
        let wish_id = Uuid::new_v4();
        assert!(NewComment::from_request(wish_id, request(Some("Ana"), "   "), None).is_none());
    }
}
