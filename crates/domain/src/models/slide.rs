//! Slide domain model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One image-plus-styling unit in a wish's playback sequence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: Uuid,
    pub wish_id: Uuid,
    pub image_url: String,
    pub frame_shape: String,
    pub slide_name: String,
    pub transition_id: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Values for a slide row about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlide {
    pub wish_id: Uuid,
    pub image_url: String,
    pub frame_shape: String,
    pub slide_name: String,
    pub transition_id: String,
    pub order_index: i32,
}
