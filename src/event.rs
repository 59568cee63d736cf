//! Core event data model.
//!
//! Events come in two shapes: a `Solo` gig by a single artist, or a
//! `Cluster` show with an ordered line-up of participants. The distinction
//! is a tagged variant in the domain model; the persisted document keeps the
//! historical flat shape with an `isClusterEvent` discriminator, converted in
//! one place via [`EventDoc`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ============================================================================
// Event Type
// ============================================================================

/// Closed set of event types. Unknown values are rejected at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// A regular booked performance.
    Gig,
    /// An open mic night.
    OpenMic,
    /// A poetry slam.
    Slam,
    /// A workshop or masterclass.
    Workshop,
    /// A featured (headline) slot.
    Feature,
    /// A curated showcase.
    Showcase,
    /// A slam finale.
    SlamFinale,
}

impl EventType {
    /// All known event types, in display order.
    pub const ALL: [EventType; 7] = [
        EventType::Gig,
        EventType::OpenMic,
        EventType::Slam,
        EventType::Workshop,
        EventType::Feature,
        EventType::Showcase,
        EventType::SlamFinale,
    ];

    /// The wire/storage identifier for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Gig => "gig",
            EventType::OpenMic => "open-mic",
            EventType::Slam => "slam",
            EventType::Workshop => "workshop",
            EventType::Feature => "feature",
            EventType::Showcase => "showcase",
            EventType::SlamFinale => "slam-finale",
        }
    }

    /// Get a human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EventType::Gig => "Gig",
            EventType::OpenMic => "Open mic",
            EventType::Slam => "Slam",
            EventType::Workshop => "Workshop",
            EventType::Feature => "Feature",
            EventType::Showcase => "Showcase",
            EventType::SlamFinale => "Slam finale",
        }
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidEventType(s.to_string()))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Supporting Types
// ============================================================================

/// A performing artist reference, denormalized for list rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub artist_id: String,
    pub artist_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_profile_pic_url: Option<String>,
}

impl Participant {
    pub fn new(artist_id: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            artist_id: artist_id.into(),
            artist_name: artist_name.into(),
            artist_profile_pic_url: None,
        }
    }

    pub fn with_profile_pic(mut self, url: impl Into<String>) -> Self {
        self.artist_profile_pic_url = Some(url.into());
        self
    }
}

/// A geographic point for map rendering of cluster events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// The variant-specific half of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A single-performer event owned by one artist.
    Solo { artist: Participant },
    /// A multi-performer show with an ordered line-up.
    Cluster {
        event_name: String,
        participants: Vec<Participant>,
        coordinates: Option<GeoPoint>,
    },
}

// ============================================================================
// Event
// ============================================================================

/// A scheduled event.
///
/// `attendee_count` always equals `attendees.len()`; both are only mutated
/// together through the store's attendance primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventDoc", into = "EventDoc")]
pub struct Event {
    /// Opaque identifier, assigned by the store on creation.
    pub id: String,
    /// Solo or cluster variant data.
    pub kind: EventKind,
    /// Absolute instant of the event. Events without a date are excluded
    /// from every date-bucketed view.
    pub date: Option<DateTime<Utc>>,
    /// Display time of day as an `HH:MM` string.
    pub event_time: Option<String>,
    pub city: String,
    pub venue: String,
    pub event_type: EventType,
    /// Optional external tickets/info URL.
    pub link: Option<String>,
    /// User ids who marked interest ("ik ga ook").
    pub attendees: Vec<String>,
    /// Denormalized cache of `attendees.len()`.
    pub attendee_count: u32,
    /// Separate interest set, not unified with `attendees`.
    pub supporters: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a solo event. The id is left empty for the store to assign.
    pub fn solo(
        artist: Participant,
        date: DateTime<Utc>,
        city: impl Into<String>,
        venue: impl Into<String>,
        event_type: EventType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            kind: EventKind::Solo { artist },
            date: Some(date),
            event_time: None,
            city: city.into(),
            venue: venue.into(),
            event_type,
            link: None,
            attendees: Vec::new(),
            attendee_count: 0,
            supporters: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a cluster event. The id is left empty for the store to assign.
    pub fn cluster(
        event_name: impl Into<String>,
        date: DateTime<Utc>,
        city: impl Into<String>,
        venue: impl Into<String>,
        event_type: EventType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            kind: EventKind::Cluster {
                event_name: event_name.into(),
                participants: Vec::new(),
                coordinates: None,
            },
            date: Some(date),
            event_time: None,
            city: city.into(),
            venue: venue.into(),
            event_type,
            link: None,
            attendees: Vec::new(),
            attendee_count: 0,
            supporters: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set a specific id (tests and fixtures).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the display time of day.
    pub fn with_time(mut self, hhmm: impl Into<String>) -> Self {
        self.event_time = Some(hhmm.into());
        self
    }

    /// Set the external link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Append a participant (cluster events only; no-op for solo).
    pub fn with_participant(mut self, participant: Participant) -> Self {
        if let EventKind::Cluster {
            ref mut participants,
            ..
        } = self.kind
        {
            participants.push(participant);
        }
        self
    }

    /// Set coordinates (cluster events only; no-op for solo).
    pub fn with_coordinates(mut self, coordinates: GeoPoint) -> Self {
        if let EventKind::Cluster {
            coordinates: ref mut coords,
            ..
        } = self.kind
        {
            *coords = Some(coordinates);
        }
        self
    }

    /// The owning artist id, for solo events.
    pub fn artist_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Solo { artist } => Some(artist.artist_id.as_str()),
            EventKind::Cluster { .. } => None,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self.kind, EventKind::Cluster { .. })
    }

    /// The line-up to render. An empty slice degrades the event to a
    /// venue-only listing.
    pub fn line_up(&self) -> &[Participant] {
        match &self.kind {
            EventKind::Solo { artist } => std::slice::from_ref(artist),
            EventKind::Cluster { participants, .. } => participants.as_slice(),
        }
    }
}

// ============================================================================
// Creation and Update Inputs
// ============================================================================

/// Raw input for creating a solo event. Field presence and the `type`
/// string are validated by the query layer before anything is stored.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    pub artist_profile_pic_url: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub event_time: Option<String>,
    pub city: Option<String>,
    pub venue: Option<String>,
    /// Unvalidated event type string, e.g. `"open-mic"`.
    pub event_type: Option<String>,
    pub link: Option<String>,
}

/// Partial update for an event. Absent fields are left untouched;
/// `updated_at` is stamped by the store on every update.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub date: Option<DateTime<Utc>>,
    pub event_time: Option<String>,
    pub event_name: Option<String>,
    pub city: Option<String>,
    pub venue: Option<String>,
    pub event_type: Option<EventType>,
    pub link: Option<String>,
}

impl EventPatch {
    /// Apply this patch to an event, trimming free-text fields.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(date) = self.date {
            event.date = Some(date);
        }
        if let Some(ref time) = self.event_time {
            event.event_time = Some(time.trim().to_string());
        }
        if let Some(ref name) = self.event_name {
            if let EventKind::Cluster {
                ref mut event_name, ..
            } = event.kind
            {
                *event_name = name.trim().to_string();
            }
        }
        if let Some(ref city) = self.city {
            event.city = city.trim().to_string();
        }
        if let Some(ref venue) = self.venue {
            event.venue = venue.trim().to_string();
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(ref link) = self.link {
            let link = link.trim();
            event.link = if link.is_empty() {
                None
            } else {
                Some(link.to_string())
            };
        }
    }
}

// ============================================================================
// Persisted Document Shape
// ============================================================================

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// The flat persisted document, matching the historical `events` collection
/// shape. Every field newer schema versions may omit carries a default, so
/// partially-populated documents deserialize cleanly; the solo/cluster
/// variant is reconstructed from the `isClusterEvent` discriminator here and
/// nowhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDoc {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_profile_pic_url: Option<String>,
    #[serde(default)]
    pub is_cluster_event: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub venue: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
    #[serde(default)]
    pub supporters: Vec<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub attendee_count: u32,
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl From<EventDoc> for Event {
    fn from(doc: EventDoc) -> Self {
        let kind = if doc.is_cluster_event {
            EventKind::Cluster {
                event_name: doc.event_name.unwrap_or_default(),
                participants: doc.participants,
                coordinates: doc.coordinates,
            }
        } else {
            EventKind::Solo {
                artist: Participant {
                    artist_id: doc.artist_id.unwrap_or_default(),
                    artist_name: doc.artist_name.unwrap_or_default(),
                    artist_profile_pic_url: doc.artist_profile_pic_url,
                },
            }
        };

        Event {
            id: doc.id,
            kind,
            date: doc.date,
            event_time: doc.event_time,
            city: doc.city,
            venue: doc.venue,
            event_type: doc.event_type,
            link: doc.link,
            attendees: doc.attendees,
            attendee_count: doc.attendee_count,
            supporters: doc.supporters,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl From<Event> for EventDoc {
    fn from(event: Event) -> Self {
        let (is_cluster_event, artist, event_name, participants, coordinates) = match event.kind {
            EventKind::Solo { artist } => (false, Some(artist), None, Vec::new(), None),
            EventKind::Cluster {
                event_name,
                participants,
                coordinates,
            } => (true, None, Some(event_name), participants, coordinates),
        };

        EventDoc {
            id: event.id,
            artist_id: artist.as_ref().map(|a| a.artist_id.clone()),
            artist_name: artist.as_ref().map(|a| a.artist_name.clone()),
            artist_profile_pic_url: artist.and_then(|a| a.artist_profile_pic_url),
            is_cluster_event,
            event_name,
            event_time: event.event_time,
            participants,
            date: event.date,
            city: event.city,
            venue: event.venue,
            event_type: event.event_type,
            link: event.link,
            coordinates,
            supporters: event.supporters,
            attendees: event.attendees,
            attendee_count: event.attendee_count,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parse() {
        assert_eq!("open-mic".parse::<EventType>().unwrap(), EventType::OpenMic);
        assert_eq!(
            "slam-finale".parse::<EventType>().unwrap(),
            EventType::SlamFinale
        );
        assert!(matches!(
            "karaoke".parse::<EventType>(),
            Err(ValidationError::InvalidEventType(_))
        ));
    }

    #[test]
    fn test_event_type_wire_names() {
        let json = serde_json::to_string(&EventType::SlamFinale).unwrap();
        assert_eq!(json, "\"slam-finale\"");
    }

    #[test]
    fn test_solo_round_trip() {
        let event = Event::solo(
            Participant::new("a1", "Mira").with_profile_pic("https://cdn/x.jpg"),
            Utc::now(),
            "Gent",
            "De Centrale",
            EventType::Gig,
        )
        .with_id("e1")
        .with_time("20:30");

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"artistId\":\"a1\""));
        assert!(json.contains("\"isClusterEvent\":false"));
        assert!(json.contains("\"type\":\"gig\""));

        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_cluster_round_trip() {
        let event = Event::cluster("Nacht van de Poëzie", Utc::now(), "Utrecht", "TivoliVredenburg", EventType::Showcase)
            .with_id("e2")
            .with_participant(Participant::new("a1", "Mira"))
            .with_participant(Participant::new("a2", "Jens"))
            .with_coordinates(GeoPoint { lat: 52.09, lng: 5.11 });

        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.line_up().len(), 2);
    }

    #[test]
    fn test_legacy_document_defaults() {
        // A historical document from before attendance and clusters existed.
        let json = r#"{
            "artistId": "a9",
            "artistName": "Lotte",
            "date": "2024-03-02T19:00:00Z",
            "city": "Breda",
            "venue": "Mezz",
            "type": "slam"
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert!(!event.is_cluster());
        assert_eq!(event.artist_id(), Some("a9"));
        assert!(event.attendees.is_empty());
        assert_eq!(event.attendee_count, 0);
        assert!(event.supporters.is_empty());
        assert!(event.link.is_none());
    }

    #[test]
    fn test_empty_line_up_degrades() {
        let event = Event::cluster("Onbekend", Utc::now(), "Brussel", "Beursschouwburg", EventType::Feature);
        assert!(event.line_up().is_empty());
    }

    #[test]
    fn test_patch_trims_fields() {
        let mut event = Event::solo(
            Participant::new("a1", "Mira"),
            Utc::now(),
            "Gent",
            "De Centrale",
            EventType::Gig,
        );

        let patch = EventPatch {
            city: Some("  Antwerpen ".to_string()),
            venue: Some(" Arenberg ".to_string()),
            link: Some("   ".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut event);

        assert_eq!(event.city, "Antwerpen");
        assert_eq!(event.venue, "Arenberg");
        assert!(event.link.is_none());
    }
}
