//! Agenda state controller.
//!
//! State lives in one explicit [`AgendaState`] record owned by a controller
//! instance; every mutation is a pure `(state, action) -> state` transition
//! in [`reduce`], and rendering is a subscriber over the derived
//! [`AgendaView`]. The day list is computed from the session-cached event
//! list; the date-tape counts come from a fresh store query on every render,
//! so the tape reflects live store state while the list reflects the
//! session. Overlapping renders are not coalesced: the last one to resolve
//! wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::aggregate;
use crate::attendance::AttendanceTracker;
use crate::config::AgendaConfig;
use crate::datetime::{end_of_local_day, start_of_local_day, today};
use crate::error::Result;
use crate::event::{Event, EventType};
use crate::filter::{day_view, AgendaFilters, Region};
use crate::query::{EventQueryEngine, UpcomingOptions};
use crate::store::EventStore;

// ============================================================================
// State and Actions
// ============================================================================

/// The agenda's presentation mode. Map rendering itself is outside this
/// core; the mode is just carried through to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Map,
}

impl ViewMode {
    fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Map,
            ViewMode::Map => ViewMode::List,
        }
    }
}

/// The controller's single mutable state record.
#[derive(Debug, Clone, PartialEq)]
pub struct AgendaState {
    pub selected_date: NaiveDate,
    /// Session-cached events, assumed fresh for the session after load.
    pub events: Vec<Event>,
    pub filters: AgendaFilters,
    pub view_mode: ViewMode,
    pub is_loading: bool,
}

impl Default for AgendaState {
    fn default() -> Self {
        Self {
            selected_date: today(),
            events: Vec::new(),
            filters: AgendaFilters::default(),
            view_mode: ViewMode::default(),
            is_loading: false,
        }
    }
}

/// User-driven and lifecycle transitions.
#[derive(Debug, Clone)]
pub enum AgendaAction {
    LoadStarted,
    EventsLoaded(Vec<Event>),
    SelectDate(NaiveDate),
    ToggleTypeFilter(EventType),
    SetRegionFilter(Region),
    /// Mirror a completed attendance toggle into the cached event so the
    /// list does not need a re-fetch.
    AttendancePatched {
        event_id: String,
        user_id: String,
        attending: bool,
    },
    ToggleViewMode,
    Reset,
}

/// Pure state transition.
pub fn reduce(mut state: AgendaState, action: AgendaAction) -> AgendaState {
    match action {
        AgendaAction::LoadStarted => {
            state.is_loading = true;
        }
        AgendaAction::EventsLoaded(events) => {
            state.events = events;
            state.is_loading = false;
        }
        AgendaAction::SelectDate(date) => {
            state.selected_date = date;
        }
        AgendaAction::ToggleTypeFilter(event_type) => {
            state.filters.toggle_type(event_type);
        }
        AgendaAction::SetRegionFilter(region) => {
            state.filters.region = region;
        }
        AgendaAction::AttendancePatched {
            event_id,
            user_id,
            attending,
        } => {
            if let Some(event) = state.events.iter_mut().find(|e| e.id == event_id) {
                if attending {
                    if !event.attendees.iter().any(|id| *id == user_id) {
                        event.attendees.push(user_id);
                    }
                } else {
                    event.attendees.retain(|id| *id != user_id);
                }
                event.attendee_count = event.attendees.len() as u32;
            }
        }
        AgendaAction::ToggleViewMode => {
            state.view_mode = state.view_mode.toggled();
        }
        AgendaAction::Reset => {
            state = AgendaState::default();
        }
    }
    state
}

// ============================================================================
// Derived View
// ============================================================================

/// The three derived views recomputed on every state change.
#[derive(Debug, Clone)]
pub struct AgendaView {
    pub selected_date: NaiveDate,
    /// Per-day counts for the scrollable date tape, from live store state.
    pub date_tape: BTreeMap<NaiveDate, usize>,
    /// The selected day's events from the session cache, filtered locally.
    pub day_events: Vec<Event>,
    pub filters: AgendaFilters,
    pub view_mode: ViewMode,
    pub is_loading: bool,
}

type RenderFn = Box<dyn Fn(&AgendaView) + Send + Sync>;

// ============================================================================
// Controller
// ============================================================================

/// Owns the agenda state and drives the render pipeline.
pub struct AgendaController<S: EventStore> {
    state: AgendaState,
    engine: EventQueryEngine<S>,
    tracker: AttendanceTracker<S>,
    config: AgendaConfig,
    subscribers: Vec<RenderFn>,
}

impl<S: EventStore> AgendaController<S> {
    pub fn new(store: Arc<S>, config: AgendaConfig) -> Self {
        Self {
            state: AgendaState::default(),
            engine: EventQueryEngine::new(Arc::clone(&store)),
            tracker: AttendanceTracker::new(store),
            config,
            subscribers: Vec::new(),
        }
    }

    /// The current state, for inspection.
    pub fn state(&self) -> &AgendaState {
        &self.state
    }

    /// Register a render subscriber, invoked with every recomputed view.
    pub fn subscribe(&mut self, render: impl Fn(&AgendaView) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(render));
    }

    /// Load the session event cache and render the initial view.
    pub async fn init(&mut self) -> AgendaView {
        self.dispatch(AgendaAction::LoadStarted);
        let events = self
            .engine
            .all_upcoming(UpcomingOptions {
                limit: self.config.session_limit,
                days_ahead: self.config.session_days_ahead,
            })
            .await;
        self.dispatch(AgendaAction::EventsLoaded(events));
        self.render().await
    }

    /// Replace the selected date.
    pub async fn select_date(&mut self, date: NaiveDate) -> AgendaView {
        self.dispatch(AgendaAction::SelectDate(date));
        self.render().await
    }

    /// Insert or remove a type from the active type set.
    pub async fn toggle_type_filter(&mut self, event_type: EventType) -> AgendaView {
        self.dispatch(AgendaAction::ToggleTypeFilter(event_type));
        self.render().await
    }

    /// Replace the region filter.
    pub async fn set_region_filter(&mut self, region: Region) -> AgendaView {
        self.dispatch(AgendaAction::SetRegionFilter(region));
        self.render().await
    }

    /// Flip between list and map presentation.
    pub async fn toggle_view_mode(&mut self) -> AgendaView {
        self.dispatch(AgendaAction::ToggleViewMode);
        self.render().await
    }

    /// Toggle attendance via the tracker, then patch the cached event and
    /// re-render. Errors propagate for user-facing messaging and leave the
    /// state unchanged.
    pub async fn toggle_attendance(&mut self, event_id: &str, user_id: &str) -> Result<bool> {
        let attending = self.tracker.toggle(event_id, user_id).await?;
        self.dispatch(AgendaAction::AttendancePatched {
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            attending,
        });
        self.render().await;
        Ok(attending)
    }

    /// Recompute the derived views and notify subscribers.
    pub async fn render(&mut self) -> AgendaView {
        let tape_start =
            start_of_local_day(self.state.selected_date - Duration::days(self.config.tape_days_back));
        let tape_end =
            end_of_local_day(self.state.selected_date + Duration::days(self.config.tape_days_ahead));

        // Fresh query: the tape reflects live store state, not the session
        // cache.
        let tape_events = self
            .engine
            .events_for_date_range(tape_start, tape_end, None)
            .await;

        let view = AgendaView {
            selected_date: self.state.selected_date,
            date_tape: aggregate::counts_per_date(&tape_events),
            day_events: day_view(&self.state.events, &self.state.filters, self.state.selected_date),
            filters: self.state.filters.clone(),
            view_mode: self.state.view_mode,
            is_loading: self.state.is_loading,
        };

        for subscriber in &self.subscribers {
            subscriber(&view);
        }

        view
    }

    /// Detach subscribers and reset state to its initial shape. Idempotent.
    pub fn cleanup(&mut self) {
        self.subscribers.clear();
        self.dispatch(AgendaAction::Reset);
    }

    fn dispatch(&mut self, action: AgendaAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }
}
