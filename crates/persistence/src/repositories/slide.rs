//! Slide repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::NewSlide;

use crate::entities::SlideEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct SlideRepository {
    pool: PgPool,
}

impl SlideRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert slides in one transaction.
    pub async fn insert_batch(&self, slides: &[NewSlide]) -> Result<Vec<SlideEntity>, sqlx::Error> {
        let timer = QueryTimer::new("insert_slides_batch");
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(slides.len());

        for slide in slides {
            let row = sqlx::query_as::<_, SlideEntity>(
                r#"
                INSERT INTO slides (wish_id, image_url, frame_shape, slide_name, transition_id, order_index)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, wish_id, image_url, frame_shape, slide_name, transition_id,
                          order_index, created_at
                "#,
            )
            .bind(slide.wish_id)
            .bind(&slide.image_url)
            .bind(&slide.frame_shape)
            .bind(&slide.slide_name)
            .bind(&slide.transition_id)
            .bind(slide.order_index)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        timer.record();
        Ok(inserted)
    }

    /// Slides of a wish in playback order.
    pub async fn list_by_wish(&self, wish_id: Uuid) -> Result<Vec<SlideEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_slides_by_wish");
        let result = sqlx::query_as::<_, SlideEntity>(
            r#"
            SELECT id, wish_id, image_url, frame_shape, slide_name, transition_id,
                   order_index, created_at
            FROM slides
            WHERE wish_id = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(wish_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
