//! Realtime comment fan-out.
//!
//! A single broadcast channel carries every new comment; WebSocket
//! subscribers filter by wish. Slow subscribers lag and skip, they never
//! block the publisher.

use domain::models::Comment;
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct CommentFeed {
    sender: broadcast::Sender<Comment>,
}

impl CommentFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a comment to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it. Having no
    /// subscribers is not an error.
    pub fn publish(&self, comment: Comment) -> usize {
        match self.sender.send(comment) {
            Ok(receivers) => receivers,
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Comment> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn comment(wish_id: Uuid, message: &str) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            wish_id,
            author_id: None,
            display_name: "Guest".to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let feed = CommentFeed::new(8);
        assert_eq!(feed.publish(comment(Uuid::new_v4(), "hi")), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let feed = CommentFeed::new(8);
        let mut rx = feed.subscribe();
        let wish_id = Uuid::new_v4();

        assert_eq!(feed.publish(comment(wish_id, "first")), 1);
        feed.publish(comment(wish_id, "second"));

        assert_eq!(rx.recv().await.unwrap().message, "first");
        assert_eq!(rx.recv().await.unwrap().message, "second");
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let feed = CommentFeed::new(2);
        let mut rx = feed.subscribe();
        let wish_id = Uuid::new_v4();

        for i in 0..5 {
            feed.publish(comment(wish_id, &format!("m{}", i)));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert_eq!(rx.recv().await.unwrap().message, "m3");
    }

    #[test]
    fn test_subscriber_count() {
        let feed = CommentFeed::new(4);
        let rx1 = feed.subscribe();
        let _rx2 = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 2);
        drop(rx1);
        assert_eq!(feed.subscriber_count(), 1);
    }
}
