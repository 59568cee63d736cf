//! Event storage trait and implementations.
//!
//! The store exposes typed CRUD plus a single query primitive over the
//! `events` collection. No business logic lives here; no transactions are
//! exposed. Attendance membership is the one exception to plain CRUD: it is
//! mutated through atomic set-union/set-remove primitives so concurrent
//! toggles by different users cannot clobber each other.

mod embedded;

pub use embedded::EmbeddedEventStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::event::{Event, EventPatch};

// ============================================================================
// Query Primitive
// ============================================================================

/// Ordering of query results by event date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    #[default]
    Ascending,
    Descending,
}

/// Predicates, ordering and limit for an event query.
///
/// `date_from`/`date_to` are inclusive bounds. Whenever either bound is set,
/// events without a date are excluded; without bounds they sort after dated
/// events.
#[derive(Debug, Clone)]
pub struct EventQuery {
    /// Equality predicate on the owning (solo) artist id.
    pub artist_id: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub order: DateOrder,
    pub limit: usize,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            artist_id: None,
            date_from: None,
            date_to: None,
            order: DateOrder::Ascending,
            limit: 100,
        }
    }
}

impl EventQuery {
    /// Query events owned by an artist.
    pub fn for_artist(artist_id: impl Into<String>) -> Self {
        Self {
            artist_id: Some(artist_id.into()),
            ..Default::default()
        }
    }

    /// Query events in an inclusive date range.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            date_from: Some(start),
            date_to: Some(end),
            ..Default::default()
        }
    }

    /// Add a lower date bound.
    pub fn from(mut self, start: DateTime<Utc>) -> Self {
        self.date_from = Some(start);
        self
    }

    /// Add an upper date bound.
    pub fn to(mut self, end: DateTime<Utc>) -> Self {
        self.date_to = Some(end);
        self
    }

    pub fn descending(mut self) -> Self {
        self.order = DateOrder::Descending;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Check whether an event matches the query predicates.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(ref artist_id) = self.artist_id {
            if event.artist_id() != Some(artist_id.as_str()) {
                return false;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = event.date else {
                return false;
            };
            if let Some(from) = self.date_from {
                if date < from {
                    return false;
                }
            }
            if let Some(to) = self.date_to {
                if date > to {
                    return false;
                }
            }
        }

        true
    }

    /// Sort events according to the query's ordering. Undated events keep a
    /// stable position after dated ones.
    pub fn sort(&self, events: &mut [Event]) {
        events.sort_by(|a, b| match (a.date, b.date) {
            (Some(a), Some(b)) => match self.order {
                DateOrder::Ascending => a.cmp(&b),
                DateOrder::Descending => b.cmp(&a),
            },
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }
}

// ============================================================================
// EventStore Trait
// ============================================================================

/// Trait for event storage backends.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Create an event. An empty id is replaced by a store-assigned one;
    /// `created_at`/`updated_at` are stamped by the store.
    async fn create(&self, event: Event) -> Result<Event>;

    /// Get an event by id.
    async fn get(&self, id: &str) -> Result<Option<Event>>;

    /// Apply a partial update; stamps `updated_at`. Returns the updated
    /// event, or `None` when the id is absent.
    async fn update(&self, id: &str, patch: EventPatch) -> Result<Option<Event>>;

    /// Hard delete by id. Returns whether an event was removed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Run a query and return matching events, ordered and capped.
    async fn query(&self, query: EventQuery) -> Result<Vec<Event>>;

    /// Atomically add a user to the attendee set and recompute
    /// `attendee_count`. Idempotent. Returns the updated event, or `None`
    /// when the id is absent.
    async fn add_attendee(&self, event_id: &str, user_id: &str) -> Result<Option<Event>>;

    /// Atomically remove a user from the attendee set and recompute
    /// `attendee_count`. Idempotent. Returns the updated event, or `None`
    /// when the id is absent.
    async fn remove_attendee(&self, event_id: &str, user_id: &str) -> Result<Option<Event>>;

    /// Remove all events.
    async fn clear(&self) -> Result<()>;
}
