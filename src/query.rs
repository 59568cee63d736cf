//! Query layer over the event store.
//!
//! Read paths never raise: a failed store call is logged and degrades to an
//! empty result so the UI falls back to an empty state. The three mutating
//! calls (`add_event`, `update_event`, `delete_event`) propagate errors to
//! the caller for user-facing messaging.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::aggregate;
use crate::datetime::{end_of_local_day, start_of_local_day, today};
use crate::error::{Result, ValidationError};
use crate::event::{Event, EventDraft, EventPatch, EventType, Participant};
use crate::store::{EventQuery, EventStore};

/// Default result cap for artist event lists.
pub const DEFAULT_ARTIST_EVENTS_LIMIT: usize = 10;
/// Default result cap for the upcoming-events feed.
pub const DEFAULT_UPCOMING_LIMIT: usize = 50;
/// Default horizon for the upcoming-events feed.
pub const DEFAULT_UPCOMING_DAYS_AHEAD: i64 = 90;
/// Default result cap for date range queries.
pub const DEFAULT_DATE_RANGE_LIMIT: usize = 100;

/// Options for [`EventQueryEngine::artist_events`].
#[derive(Debug, Clone)]
pub struct ArtistEventsOptions {
    /// Only events dated now or later, ascending. Otherwise all events,
    /// most recent first.
    pub upcoming_only: bool,
    pub limit: usize,
}

impl Default for ArtistEventsOptions {
    fn default() -> Self {
        Self {
            upcoming_only: false,
            limit: DEFAULT_ARTIST_EVENTS_LIMIT,
        }
    }
}

/// Options for [`EventQueryEngine::all_upcoming`].
#[derive(Debug, Clone)]
pub struct UpcomingOptions {
    pub limit: usize,
    pub days_ahead: i64,
}

impl Default for UpcomingOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_UPCOMING_LIMIT,
            days_ahead: DEFAULT_UPCOMING_DAYS_AHEAD,
        }
    }
}

/// Composed store queries for the agenda.
pub struct EventQueryEngine<S: EventStore> {
    store: Arc<S>,
}

impl<S: EventStore> Clone for EventQueryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EventStore> EventQueryEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Read Paths
    // ========================================================================

    /// Events owned by an artist, optionally restricted to upcoming ones.
    pub async fn artist_events(&self, artist_id: &str, opts: ArtistEventsOptions) -> Vec<Event> {
        let mut query = EventQuery::for_artist(artist_id).with_limit(opts.limit);
        if opts.upcoming_only {
            query = query.from(Utc::now());
        } else {
            query = query.descending();
        }

        self.run_query(query).await
    }

    /// All events from the start of today through `days_ahead` days out,
    /// ascending.
    pub async fn all_upcoming(&self, opts: UpcomingOptions) -> Vec<Event> {
        let start = start_of_local_day(today());
        let end = end_of_local_day(today() + Duration::days(opts.days_ahead));

        self.run_query(EventQuery::between(start, end).with_limit(opts.limit))
            .await
    }

    /// Events in an inclusive range, ascending. `limit` defaults to 100.
    pub async fn events_for_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Vec<Event> {
        let limit = limit.unwrap_or(DEFAULT_DATE_RANGE_LIMIT);
        self.run_query(EventQuery::between(start, end).with_limit(limit))
            .await
    }

    /// Whether the artist has at least one event on the given local day.
    pub async fn has_event_on_date(&self, artist_id: &str, day: NaiveDate) -> bool {
        let query = EventQuery::for_artist(artist_id)
            .from(start_of_local_day(day))
            .to(end_of_local_day(day))
            .with_limit(1);

        !self.run_query(query).await.is_empty()
    }

    /// Get a single event. Absent ids and store failures both resolve to
    /// `None`.
    pub async fn get_event(&self, id: &str) -> Option<Event> {
        match self.store.get(id).await {
            Ok(event) => event,
            Err(err) => {
                warn!("event fetch failed for {}: {}", id, err);
                None
            }
        }
    }

    /// Fetch a range and group it by local calendar day.
    pub async fn events_grouped_by_date(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BTreeMap<NaiveDate, Vec<Event>> {
        let events = self.events_for_date_range(start, end, None).await;
        aggregate::group_by_local_date(&events)
    }

    /// Fetch a range and count events per local calendar day.
    pub async fn event_counts_per_date(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BTreeMap<NaiveDate, usize> {
        let events = self.events_for_date_range(start, end, None).await;
        aggregate::counts_per_date(&events)
    }

    async fn run_query(&self, query: EventQuery) -> Vec<Event> {
        match self.store.query(query).await {
            Ok(events) => events,
            Err(err) => {
                warn!("event query failed: {}", err);
                Vec::new()
            }
        }
    }

    // ========================================================================
    // Mutating Paths
    // ========================================================================

    /// Validate a draft and create a solo event. The store assigns the id
    /// and timestamps; `supporters` starts empty.
    pub async fn add_event(&self, draft: EventDraft) -> Result<Event> {
        let artist_id = required(draft.artist_id, "artistId")?;
        let artist_name = required(draft.artist_name, "artistName")?;
        let date = draft
            .date
            .ok_or(ValidationError::MissingField("date"))?;
        let city = required(draft.city, "city")?;
        let venue = required(draft.venue, "venue")?;
        let type_str = required(draft.event_type, "type")?;
        let event_type: EventType = type_str.parse()?;

        let mut artist = Participant::new(artist_id, artist_name);
        artist.artist_profile_pic_url = draft.artist_profile_pic_url;

        let mut event = Event::solo(artist, date, city, venue, event_type);
        event.event_time = draft.event_time.map(|t| t.trim().to_string());
        event.link = draft
            .link
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        let created = self.store.create(event).await?;
        debug!("Added event {} at {}", created.id, created.venue);
        Ok(created)
    }

    /// Apply a partial update. `updated_at` is stamped by the store.
    pub async fn update_event(&self, id: &str, patch: EventPatch) -> Result<Event> {
        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| crate::error::PodiumError::NotFound(id.to_string()))
    }

    /// Unconditional hard delete. Ownership must already be authorized by
    /// the caller.
    pub async fn delete_event(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        debug!("Deleted event {}", id);
        Ok(())
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    let trimmed = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field).into())
    } else {
        Ok(trimmed)
    }
}
