//! Access gate: decides what a visitor sees for a resolved wish.
//!
//! Checks run in a fixed order: expired, countdown, public reveal, password.
//! The countdown check happens before any password check, so a correct
//! password never reveals a wish early.

use chrono::{DateTime, Utc};

use shared::password::verify_password;

use crate::error::WishError;
use crate::models::{Privacy, Slide, Wish, WishStatus};
use crate::services::store::WishStore;

/// Outcome of a single gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Expired,
    Countdown {
        reveal_at: DateTime<Utc>,
        seconds_remaining: i64,
    },
    PasswordRequired,
    AccessDenied,
    Reveal,
}

/// Evaluates the gate without touching storage.
pub fn evaluate(wish: &Wish, now: DateTime<Utc>, attempt: Option<&str>) -> GateDecision {
    if wish.status == WishStatus::Expired {
        return GateDecision::Expired;
    }
    unlock(wish, now, attempt)
}

/// Evaluates access to the comment thread of `wish`.
///
/// Same rules as the content, except that the thread of an expired wish
/// stays readable to anyone who could have opened the wish.
pub fn evaluate_thread(wish: &Wish, now: DateTime<Utc>, attempt: Option<&str>) -> GateDecision {
    unlock(wish, now, attempt)
}

fn unlock(wish: &Wish, now: DateTime<Utc>, attempt: Option<&str>) -> GateDecision {
    if !wish.is_revealed_at(now) {
        let seconds_remaining = (wish.reveal_at - now).num_seconds().max(1);
        return GateDecision::Countdown {
            reveal_at: wish.reveal_at,
            seconds_remaining,
        };
    }

    if wish.privacy == Privacy::Public {
        return GateDecision::Reveal;
    }

    let attempt = match attempt.filter(|a| !a.is_empty()) {
        Some(attempt) => attempt,
        None => return GateDecision::PasswordRequired,
    };

    let Some(hash) = wish.password_hash.as_deref() else {
        tracing::error!(wish_id = %wish.id, "Private wish has no password hash");
        return GateDecision::AccessDenied;
    };

    match verify_password(attempt, hash) {
        Ok(true) => GateDecision::Reveal,
        Ok(false) => GateDecision::AccessDenied,
        Err(e) => {
            tracing::error!(wish_id = %wish.id, error = %e, "Stored password hash is unreadable");
            GateDecision::AccessDenied
        }
    }
}

/// What the visitor is shown after a gate pass.
#[derive(Debug, Clone)]
pub enum Visit {
    Content { wish: Wish, slides: Vec<Slide> },
    Countdown {
        reveal_at: DateTime<Utc>,
        seconds_remaining: i64,
    },
    PasswordRequired,
}

/// Runs the gate for a visitor and applies the lifecycle on a reveal.
///
/// Only a revealing pass mutates storage: the view is counted and a scheduled
/// wish becomes active in one store call. `Expired` and `AccessDenied`
/// decisions come back as errors.
pub async fn open_wish(
    store: &dyn WishStore,
    wish: Wish,
    now: DateTime<Utc>,
    attempt: Option<&str>,
) -> Result<Visit, WishError> {
    match evaluate(&wish, now, attempt) {
        GateDecision::Expired => Err(WishError::Expired),
        GateDecision::AccessDenied => Err(WishError::AccessDenied),
        GateDecision::PasswordRequired => Ok(Visit::PasswordRequired),
        GateDecision::Countdown {
            reveal_at,
            seconds_remaining,
        } => Ok(Visit::Countdown {
            reveal_at,
            seconds_remaining,
        }),
        GateDecision::Reveal => {
            let Some(updated) = store.record_view(wish.id).await? else {
                // The store's clock or a concurrent expiry disagreed.
                return match store.find_by_id(wish.id).await? {
                    Some(current) if current.status == WishStatus::Expired => {
                        Err(WishError::Expired)
                    }
                    Some(current) => Ok(Visit::Countdown {
                        reveal_at: current.reveal_at,
                        seconds_remaining: (current.reveal_at - now).num_seconds().max(1),
                    }),
                    None => Err(WishError::NotFound),
                };
            };

            if wish.status == WishStatus::Scheduled && updated.status == WishStatus::Active {
                tracing::info!(wish_id = %updated.id, "Wish activated on first reveal");
            }

            let slides = store.list_slides(updated.id).await?;
            Ok(Visit::Content {
                wish: updated,
                slides,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewSlide;
    use crate::services::memory::{sample_new_wish, InMemoryWishStore};
    use chrono::Duration;
    use shared::password::hash_password;
    use uuid::Uuid;

    fn wish_at(reveal_at: DateTime<Utc>) -> Wish {
        Wish {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            custom_url: "NA/sam".to_string(),
            recipient_name: "Sam".to_string(),
            gradient_id: "sunset".to_string(),
            note_message: None,
            note_author: None,
            music_type: crate::models::MusicType::Preset,
            music_preset: Some("happy-classic".to_string()),
            music_url: None,
            birthday_date: reveal_at.date_naive(),
            birthday_time: reveal_at.time(),
            reveal_at,
            privacy: Privacy::Public,
            password_hash: None,
            status: WishStatus::Scheduled,
            views_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn private(mut wish: Wish, password: &str) -> Wish {
        wish.privacy = Privacy::Private;
        wish.password_hash = Some(hash_password(password).unwrap());
        wish
    }

    #[test]
    fn test_countdown_before_reveal() {
        let now = Utc::now();
        let wish = wish_at(now + Duration::seconds(90));
        assert_eq!(
            evaluate(&wish, now, None),
            GateDecision::Countdown {
                reveal_at: wish.reveal_at,
                seconds_remaining: 90
            }
        );
    }

    #[test]
    fn test_reveal_exactly_at_instant() {
        let now = Utc::now();
        let wish = wish_at(now);
        assert_eq!(evaluate(&wish, now, None), GateDecision::Reveal);
    }

    #[test]
    fn test_no_premature_reveal_with_correct_password() {
        let now = Utc::now();
        let wish = private(wish_at(now + Duration::hours(2)), "secret1");
        assert!(matches!(
            evaluate(&wish, now, Some("secret1")),
            GateDecision::Countdown { .. }
        ));
    }

    #[test]
    fn test_thread_follows_reveal_and_password() {
        let now = Utc::now();

        let early = wish_at(now + Duration::minutes(5));
        assert!(matches!(
            evaluate_thread(&early, now, None),
            GateDecision::Countdown { .. }
        ));

        let locked = private(wish_at(now - Duration::minutes(5)), "secret1");
        assert_eq!(evaluate_thread(&locked, now, None), GateDecision::PasswordRequired);
        assert_eq!(evaluate_thread(&locked, now, Some("nope")), GateDecision::AccessDenied);
        assert_eq!(evaluate_thread(&locked, now, Some("secret1")), GateDecision::Reveal);

        let mut expired = wish_at(now - Duration::days(3));
        expired.status = WishStatus::Expired;
        assert_eq!(evaluate(&expired, now, None), GateDecision::Expired);
        assert_eq!(evaluate_thread(&expired, now, None), GateDecision::Reveal);
    }

    #[test]
    fn test_private_wish_password_paths() {
        let now = Utc::now();
        let wish = private(wish_at(now - Duration::minutes(1)), "secret1");
        assert_eq!(evaluate(&wish, now, None), GateDecision::PasswordRequired);
        assert_eq!(evaluate(&wish, now, Some("")), GateDecision::PasswordRequired);
        assert_eq!(evaluate(&wish, now, Some("wrong")), GateDecision::AccessDenied);
        assert_eq!(evaluate(&wish, now, Some("Secret1")), GateDecision::AccessDenied);
        assert_eq!(evaluate(&wish, now, Some("secret1")), GateDecision::Reveal);
    }

    #[test]
    fn test_expired_short_circuits_everything() {
        let now = Utc::now();
        for reveal_at in [now - Duration::days(1), now + Duration::days(1)] {
            let mut public = wish_at(reveal_at);
            public.status = WishStatus::Expired;
            assert_eq!(evaluate(&public, now, None), GateDecision::Expired);

            let mut locked = private(wish_at(reveal_at), "secret1");
            locked.status = WishStatus::Expired;
            assert_eq!(evaluate(&locked, now, Some("secret1")), GateDecision::Expired);
            assert_eq!(evaluate(&locked, now, Some("nope")), GateDecision::Expired);
        }
    }

    #[test]
    fn test_private_without_hash_is_denied() {
        let now = Utc::now();
        let mut wish = wish_at(now - Duration::minutes(1));
        wish.privacy = Privacy::Private;
        assert_eq!(evaluate(&wish, now, Some("anything")), GateDecision::AccessDenied);
    }

    #[tokio::test]
    async fn test_public_on_time_reveal_activates_and_counts() {
        let store = InMemoryWishStore::new();
        let wish = store
            .insert_wish(sample_new_wish(
                Uuid::new_v4(),
                "NA/sam",
                Utc::now() - Duration::seconds(5),
            ))
            .await
            .unwrap();
        store
            .insert_slides(vec![NewSlide {
                wish_id: wish.id,
                image_url: "/media/a.jpg".to_string(),
                frame_shape: "heart".to_string(),
                slide_name: "First".to_string(),
                transition_id: "fade".to_string(),
                order_index: 0,
            }])
            .await
            .unwrap();

        let visit = open_wish(&store, wish.clone(), Utc::now(), None).await.unwrap();
        match visit {
            Visit::Content { wish: shown, slides } => {
                assert_eq!(shown.status, WishStatus::Active);
                assert_eq!(shown.views_count, 1);
                assert_eq!(slides.len(), 1);
            }
            other => panic!("unexpected visit: {:?}", other),
        }

        let current = store.find_by_id(wish.id).await.unwrap().unwrap();
        let visit = open_wish(&store, current, Utc::now(), None).await.unwrap();
        assert!(matches!(visit, Visit::Content { wish, .. } if wish.views_count == 2));
    }

    #[tokio::test]
    async fn test_wrong_password_mutates_nothing() {
        let store = InMemoryWishStore::new();
        let mut new_wish =
            sample_new_wish(Uuid::new_v4(), "NA/sam", Utc::now() - Duration::seconds(5));
        new_wish.privacy = Privacy::Private;
        new_wish.password_hash = Some(hash_password("secret1").unwrap());
        let wish = store.insert_wish(new_wish).await.unwrap();

        let err = open_wish(&store, wish.clone(), Utc::now(), Some("guess"))
            .await
            .unwrap_err();
        assert!(matches!(err, WishError::AccessDenied));

        let current = store.find_by_id(wish.id).await.unwrap().unwrap();
        assert_eq!(current.status, WishStatus::Scheduled);
        assert_eq!(current.views_count, 0);

        let visit = open_wish(&store, current, Utc::now(), Some("secret1"))
            .await
            .unwrap();
        assert!(matches!(visit, Visit::Content { wish, .. } if wish.status == WishStatus::Active));
    }

    #[tokio::test]
    async fn test_countdown_visit_mutates_nothing() {
        let store = InMemoryWishStore::new();
        let wish = store
            .insert_wish(sample_new_wish(
                Uuid::new_v4(),
                "NA/sam",
                Utc::now() + Duration::hours(3),
            ))
            .await
            .unwrap();

        let visit = open_wish(&store, wish.clone(), Utc::now(), None).await.unwrap();
        assert!(matches!(visit, Visit::Countdown { .. }));

        let current = store.find_by_id(wish.id).await.unwrap().unwrap();
        assert_eq!(current.views_count, 0);
        assert_eq!(current.status, WishStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_expired_after_activation_stops_serving() {
        let store = InMemoryWishStore::new();
        let wish = store
            .insert_wish(sample_new_wish(
                Uuid::new_v4(),
                "NA/sam",
                Utc::now() - Duration::minutes(1),
            ))
            .await
            .unwrap();
        open_wish(&store, wish.clone(), Utc::now(), None).await.unwrap();
        store.mark_expired(wish.id).await.unwrap();

        let current = store.find_by_id(wish.id).await.unwrap().unwrap();
        let err = open_wish(&store, current, Utc::now(), None).await.unwrap_err();
        assert!(matches!(err, WishError::Expired));
    }

    #[tokio::test]
    async fn test_stale_snapshot_respects_concurrent_expiry() {
        let store = InMemoryWishStore::new();
        let wish = store
            .insert_wish(sample_new_wish(
                Uuid::new_v4(),
                "NA/sam",
                Utc::now() - Duration::minutes(1),
            ))
            .await
            .unwrap();
        store.mark_expired(wish.id).await.unwrap();

        // `wish` still says scheduled; the store must refuse the view.
        let err = open_wish(&store, wish.clone(), Utc::now(), None).await.unwrap_err();
        assert!(matches!(err, WishError::Expired));
        let current = store.find_by_id(wish.id).await.unwrap().unwrap();
        assert_eq!(current.views_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_views_are_not_lost() {
        let store = std::sync::Arc::new(InMemoryWishStore::new());
        let wish = store
            .insert_wish(sample_new_wish(
                Uuid::new_v4(),
                "NA/sam",
                Utc::now() - Duration::minutes(1),
            ))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            let wish = wish.clone();
            handles.push(tokio::spawn(async move {
                open_wish(store.as_ref(), wish, Utc::now(), None).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let current = store.find_by_id(wish.id).await.unwrap().unwrap();
        assert_eq!(current.views_count, 20);
        assert_eq!(current.status, WishStatus::Active);
    }
}
