//! Pure predicate composition over event lists.
//!
//! The region filter is a best-effort city-name-substring heuristic, not a
//! geocoded boundary test; cities missing from the marker lists are false
//! negatives by design.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::datetime::local_day;
use crate::event::{Event, EventType};

// ============================================================================
// Region Filter
// ============================================================================

const NEDERLAND_MARKERS: &[&str] = &[
    "amsterdam",
    "rotterdam",
    "den haag",
    "utrecht",
    "eindhoven",
    "groningen",
    "nijmegen",
    "tilburg",
    "breda",
    "arnhem",
    "maastricht",
    "leiden",
    "haarlem",
    "zwolle",
    "enschede",
    "amersfoort",
    "delft",
    "deventer",
];

const VLAANDEREN_MARKERS: &[&str] = &[
    "antwerpen",
    "gent",
    "brugge",
    "leuven",
    "hasselt",
    "mechelen",
    "oostende",
    "kortrijk",
    "aalst",
    "genk",
    "turnhout",
    "roeselare",
    "sint-niklaas",
];

const BRUSSEL_MARKERS: &[&str] = &[
    "brussel",
    "bruxelles",
    "brussels",
    "schaarbeek",
    "elsene",
    "ixelles",
    "anderlecht",
    "etterbeek",
    "ukkel",
    "uccle",
    "molenbeek",
    "jette",
    "vorst",
];

/// Static region grouping by city-name substrings. `All` is the identity
/// filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    All,
    Nederland,
    Vlaanderen,
    Brussel,
}

impl Region {
    /// The lowercase city markers for this region. Lists are pairwise
    /// disjoint as substrings; a city matching one region never matches
    /// another.
    pub fn city_markers(self) -> &'static [&'static str] {
        match self {
            Region::All => &[],
            Region::Nederland => NEDERLAND_MARKERS,
            Region::Vlaanderen => VLAANDEREN_MARKERS,
            Region::Brussel => BRUSSEL_MARKERS,
        }
    }

    /// Whether a city string (case-folded) belongs to this region.
    pub fn admits(self, city: &str) -> bool {
        if self == Region::All {
            return true;
        }
        let city = city.to_lowercase();
        self.city_markers().iter().any(|m| city.contains(m))
    }
}

// ============================================================================
// Composed Agenda Filters
// ============================================================================

/// Active agenda filters: a type set and a region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgendaFilters {
    /// Active event types. Empty means "all types", not "no types".
    pub types: Vec<EventType>,
    pub region: Region,
}

impl AgendaFilters {
    /// Insert or remove a type from the active set.
    pub fn toggle_type(&mut self, event_type: EventType) {
        if self.types.contains(&event_type) {
            self.types.retain(|t| *t != event_type);
        } else {
            self.types.push(event_type);
        }
    }

    /// Whether an event passes both filters (logical AND).
    pub fn admits(&self, event: &Event) -> bool {
        if !self.types.is_empty() && !self.types.contains(&event.event_type) {
            return false;
        }
        self.region.admits(&event.city)
    }
}

/// Events admitted by the active filters, in input order.
pub fn filter_events(events: &[Event], filters: &AgendaFilters) -> Vec<Event> {
    events
        .iter()
        .filter(|e| filters.admits(e))
        .cloned()
        .collect()
}

/// The filtered list for one selected local day: region/type filtering
/// constrains a fixed day's events, not a date range.
pub fn day_view(events: &[Event], filters: &AgendaFilters, day: NaiveDate) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.date.is_some_and(|d| local_day(d) == day))
        .filter(|e| filters.admits(e))
        .cloned()
        .collect()
}
