//! Podium: event scheduling and attendance aggregation engine.
//!
//! The agenda core of a platform matching performing artists with event
//! organizers:
//!
//! - **Event Store**: typed CRUD and query primitives over the `events`
//!   collection, with atomic attendance membership
//! - **Query Layer**: by-artist, upcoming, date-range and existence queries
//! - **Aggregation**: pure local-day grouping and per-day counts for the
//!   date-tape heatmap
//! - **Attendance**: "I'm going too" toggling, notifications, profile
//!   resolution
//! - **Filters**: type-set and region (city-marker) predicates
//! - **Agenda Controller**: reducer-driven view state with a render
//!   subscriber pipeline
//!
//! # Usage
//!
//! ```ignore
//! use podium::{AgendaController, AgendaConfig, EmbeddedEventStore, EventDraft};
//! use std::sync::Arc;
//!
//! let store = Arc::new(EmbeddedEventStore::new());
//! let mut agenda = AgendaController::new(store.clone(), AgendaConfig::default());
//!
//! let view = agenda.init().await;
//! let view = agenda.select_date(view.selected_date.succ_opt().unwrap()).await;
//! agenda.toggle_attendance("event-id", "user-id").await?;
//! ```

pub mod agenda;
pub mod aggregate;
pub mod attendance;
pub mod config;
pub mod datetime;
pub mod error;
pub mod event;
pub mod filter;
pub mod profiles;
pub mod query;
pub mod store;

pub use agenda::{reduce, AgendaAction, AgendaController, AgendaState, AgendaView, ViewMode};
pub use aggregate::{counts_per_date, group_by_local_date};
pub use attendance::{AttendanceTracker, AttendeeNotification};
pub use config::{AgendaConfig, Config, QueryConfig, StoreConfig};
pub use datetime::{
    date_key, end_of_local_day, format_day_label, format_event_date, local_day,
    start_of_local_day, today,
};
pub use error::{ConfigError, PodiumError, Result, StoreError, ValidationError};
pub use event::{
    Event, EventDoc, EventDraft, EventKind, EventPatch, EventType, GeoPoint, Participant,
};
pub use filter::{day_view, filter_events, AgendaFilters, Region};
pub use profiles::{
    resolve_attendee_profiles, CurrentUser, InMemoryDirectory, ProfileDirectory, Role,
    UserProfile, DEFAULT_PROFILE_CAP,
};
pub use query::{ArtistEventsOptions, EventQueryEngine, UpcomingOptions};
pub use store::{DateOrder, EmbeddedEventStore, EventQuery, EventStore};
