//! Attendance toggling and attendee aggregation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{PodiumError, Result};
use crate::event::Event;
use crate::query::{ArtistEventsOptions, EventQueryEngine};
use crate::store::EventStore;

/// How many of an artist's events are scanned for notifications.
const NOTIFICATION_SCAN_LIMIT: usize = 100;

/// Attendees of one event, for the owning artist's notification feed.
#[derive(Debug, Clone)]
pub struct AttendeeNotification {
    pub event: Event,
    /// Attendee ids excluding the owning artist's own id.
    pub attendee_ids: Vec<String>,
}

/// Tracks "I'm going too" membership on events.
///
/// The membership write goes through the store's atomic set primitives, so
/// two users toggling the same event concurrently both land; only the
/// membership *read* that decides add-versus-remove is optimistic.
pub struct AttendanceTracker<S: EventStore> {
    store: Arc<S>,
}

impl<S: EventStore> Clone for AttendanceTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EventStore> AttendanceTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Toggle a user's membership in an event's attendee set.
    ///
    /// Returns whether the user is attending **after** the toggle. The
    /// caller is expected to mirror the result into any locally cached copy
    /// of the event so the UI does not need a re-fetch.
    pub async fn toggle(&self, event_id: &str, user_id: &str) -> Result<bool> {
        let event = self
            .store
            .get(event_id)
            .await?
            .ok_or_else(|| PodiumError::NotFound(event_id.to_string()))?;

        let attending = !event.attendees.iter().any(|id| id == user_id);
        let updated = if attending {
            self.store.add_attendee(event_id, user_id).await?
        } else {
            self.store.remove_attendee(event_id, user_id).await?
        };

        if updated.is_none() {
            // Deleted between the read and the write.
            return Err(PodiumError::NotFound(event_id.to_string()));
        }

        debug!(
            "User {} {} event {}",
            user_id,
            if attending { "joined" } else { "left" },
            event_id
        );
        Ok(attending)
    }

    /// Whether a user is currently attending. Read path: absent events and
    /// store failures resolve to `false`.
    pub async fn is_attending(&self, event_id: &str, user_id: &str) -> bool {
        match self.store.get(event_id).await {
            Ok(Some(event)) => event.attendees.iter().any(|id| id == user_id),
            Ok(None) => false,
            Err(err) => {
                warn!("attendance check failed for {}: {}", event_id, err);
                false
            }
        }
    }

    /// For every event owned by the artist, the attendees other than the
    /// artist themselves. Events nobody else attends are omitted.
    pub async fn notifications_for_artist(&self, artist_id: &str) -> Vec<AttendeeNotification> {
        let engine = EventQueryEngine::new(Arc::clone(&self.store));
        let events = engine
            .artist_events(
                artist_id,
                ArtistEventsOptions {
                    upcoming_only: false,
                    limit: NOTIFICATION_SCAN_LIMIT,
                },
            )
            .await;

        events
            .into_iter()
            .filter_map(|event| {
                let attendee_ids: Vec<String> = event
                    .attendees
                    .iter()
                    .filter(|id| id.as_str() != artist_id)
                    .cloned()
                    .collect();

                if attendee_ids.is_empty() {
                    None
                } else {
                    Some(AttendeeNotification {
                        event,
                        attendee_ids,
                    })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventType, Participant};
    use crate::store::EmbeddedEventStore;
    use chrono::{Duration, Utc};

    async fn seed_event(store: &Arc<EmbeddedEventStore>, artist_id: &str) -> Event {
        store
            .create(Event::solo(
                Participant::new(artist_id, "Mira"),
                Utc::now() + Duration::days(1),
                "Gent",
                "De Centrale",
                EventType::Gig,
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_toggle_scenario() {
        let store = Arc::new(EmbeddedEventStore::new());
        let tracker = AttendanceTracker::new(Arc::clone(&store));
        let event = seed_event(&store, "a1").await;

        assert!(tracker.toggle(&event.id, "u1").await.unwrap());
        let after = store.get(&event.id).await.unwrap().unwrap();
        assert_eq!(after.attendees, vec!["u1".to_string()]);
        assert_eq!(after.attendee_count, 1);

        assert!(!tracker.toggle(&event.id, "u1").await.unwrap());
        let after = store.get(&event.id).await.unwrap().unwrap();
        assert!(after.attendees.is_empty());
        assert_eq!(after.attendee_count, 0);
    }

    #[tokio::test]
    async fn test_double_toggle_restores_original_membership() {
        let store = Arc::new(EmbeddedEventStore::new());
        let tracker = AttendanceTracker::new(Arc::clone(&store));
        let event = seed_event(&store, "a1").await;
        store.add_attendee(&event.id, "u0").await.unwrap();

        let before = store.get(&event.id).await.unwrap().unwrap();
        tracker.toggle(&event.id, "u1").await.unwrap();
        tracker.toggle(&event.id, "u1").await.unwrap();
        let after = store.get(&event.id).await.unwrap().unwrap();

        assert_eq!(before.attendees, after.attendees);
        assert_eq!(before.attendee_count, after.attendee_count);
    }

    #[tokio::test]
    async fn test_toggle_missing_event() {
        let store = Arc::new(EmbeddedEventStore::new());
        let tracker = AttendanceTracker::new(store);
        assert!(matches!(
            tracker.toggle("nope", "u1").await,
            Err(PodiumError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_is_attending() {
        let store = Arc::new(EmbeddedEventStore::new());
        let tracker = AttendanceTracker::new(Arc::clone(&store));
        let event = seed_event(&store, "a1").await;

        assert!(!tracker.is_attending(&event.id, "u1").await);
        tracker.toggle(&event.id, "u1").await.unwrap();
        assert!(tracker.is_attending(&event.id, "u1").await);
        assert!(!tracker.is_attending("nope", "u1").await);
    }

    #[tokio::test]
    async fn test_notifications_exclude_owner_and_empty_events() {
        let store = Arc::new(EmbeddedEventStore::new());
        let tracker = AttendanceTracker::new(Arc::clone(&store));

        let attended = seed_event(&store, "a1").await;
        store.add_attendee(&attended.id, "a1").await.unwrap();
        store.add_attendee(&attended.id, "u1").await.unwrap();

        // Only the artist themselves marked this one.
        let own_only = seed_event(&store, "a1").await;
        store.add_attendee(&own_only.id, "a1").await.unwrap();

        // Nobody marked this one.
        seed_event(&store, "a1").await;

        let notifications = tracker.notifications_for_artist("a1").await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].event.id, attended.id);
        assert_eq!(notifications[0].attendee_ids, vec!["u1".to_string()]);
    }
}
