//! Slide entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct SlideEntity {
    pub id: Uuid,
    pub wish_id: Uuid,
    pub image_url: String,
    pub frame_shape: String,
    pub slide_name: String,
    pub transition_id: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

impl From<SlideEntity> for domain::models::Slide {
    fn from(entity: SlideEntity) -> Self {
        Self {
            id: entity.id,
            wish_id: entity.wish_id,
            image_url: entity.image_url,
            frame_shape: entity.frame_shape,
            slide_name: entity.slide_name,
            transition_id: entity.transition_id,
            order_index: entity.order_index,
            created_at: entity.created_at,
        }
    }
}
