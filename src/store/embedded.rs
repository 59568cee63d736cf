//! In-memory event store with optional JSON file persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, RwLock};

use crate::error::{PodiumError, Result, StoreError};
use crate::event::{Event, EventPatch};
use crate::store::{EventQuery, EventStore};

use async_trait::async_trait;
use chrono::Utc;

/// Internal data storage structure.
#[derive(Debug, Default)]
struct EventData {
    /// Events indexed by id.
    events: HashMap<String, Event>,
    /// Index: solo artist id -> event ids.
    by_artist: HashMap<String, Vec<String>>,
}

impl EventData {
    fn index_artist(&mut self, event: &Event) {
        if let Some(artist_id) = event.artist_id() {
            self.by_artist
                .entry(artist_id.to_string())
                .or_default()
                .push(event.id.clone());
        }
    }

    fn unindex_artist(&mut self, event: &Event) {
        if let Some(artist_id) = event.artist_id() {
            if let Some(ids) = self.by_artist.get_mut(artist_id) {
                ids.retain(|id| id != &event.id);
            }
        }
    }

    /// Candidate events for a query, using the artist index when possible.
    fn candidates(&self, query: &EventQuery) -> Vec<Event> {
        match query.artist_id {
            Some(ref artist_id) => self
                .by_artist
                .get(artist_id)
                .into_iter()
                .flatten()
                .filter_map(|id| self.events.get(id))
                .cloned()
                .collect(),
            None => self.events.values().cloned().collect(),
        }
    }
}

/// Persisted file format.
#[derive(Debug, Serialize, Deserialize)]
struct PersistenceData {
    version: u32,
    events: Vec<Event>,
}

/// In-memory event store with optional persistence.
///
/// Events live in a HashMap behind a single RwLock; the attendance
/// primitives mutate the set and its count under one write-lock acquisition,
/// so two concurrent toggles can never read the same array and clobber each
/// other's write.
pub struct EmbeddedEventStore {
    data: RwLock<EventData>,
    persistence_path: Option<PathBuf>,
    persist_lock: AsyncMutex<()>,
}

impl Default for EmbeddedEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddedEventStore {
    /// Create a new in-memory store without persistence.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(EventData::default()),
            persistence_path: None,
            persist_lock: AsyncMutex::new(()),
        }
    }

    /// Create a store persisting to `<data_dir>/events.json`, loading any
    /// existing data.
    pub async fn with_persistence(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(StoreError::Io)?;

        let persistence_path = data_dir.join("events.json");
        let store = Self {
            data: RwLock::new(EventData::default()),
            persistence_path: Some(persistence_path.clone()),
            persist_lock: AsyncMutex::new(()),
        };

        if persistence_path.exists() {
            store.load_from_file(&persistence_path).await?;
        }

        Ok(store)
    }

    async fn load_from_file(&self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(StoreError::Io)?;

        let persisted: PersistenceData =
            serde_json::from_str(&content).map_err(PodiumError::Serialization)?;

        let mut data = self.data.write().await;
        for event in persisted.events {
            data.index_artist(&event);
            data.events.insert(event.id.clone(), event);
        }

        tracing::info!("Loaded {} events from {}", data.events.len(), path.display());

        Ok(())
    }

    /// Persist to file if persistence is enabled.
    async fn persist(&self) -> Result<()> {
        let Some(ref path) = self.persistence_path else {
            return Ok(());
        };

        let _lock = self.persist_lock.lock().await;

        let data = self.data.read().await;
        let events: Vec<Event> = data.events.values().cloned().collect();
        drop(data);

        let persisted = PersistenceData { version: 1, events };
        let content =
            serde_json::to_string_pretty(&persisted).map_err(PodiumError::Serialization)?;

        // Write to temp file first, then rename for atomicity.
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(StoreError::Io)?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(StoreError::Io)?;

        Ok(())
    }
}

#[async_trait]
impl EventStore for EmbeddedEventStore {
    async fn create(&self, mut event: Event) -> Result<Event> {
        if event.id.is_empty() {
            event.id = uuid::Uuid::new_v4().to_string();
        }
        let now = Utc::now();
        event.created_at = now;
        event.updated_at = now;

        {
            let mut data = self.data.write().await;
            data.index_artist(&event);
            data.events.insert(event.id.clone(), event.clone());
        }

        self.persist().await?;
        tracing::debug!("Created event {} in {}", event.id, event.city);
        Ok(event)
    }

    async fn get(&self, id: &str) -> Result<Option<Event>> {
        let data = self.data.read().await;
        Ok(data.events.get(id).cloned())
    }

    async fn update(&self, id: &str, patch: EventPatch) -> Result<Option<Event>> {
        let updated = {
            let mut data = self.data.write().await;
            match data.events.get_mut(id) {
                Some(event) => {
                    patch.apply_to(event);
                    event.updated_at = Utc::now();
                    Some(event.clone())
                }
                None => None,
            }
        };

        if updated.is_some() {
            self.persist().await?;
            tracing::debug!("Updated event {}", id);
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut data = self.data.write().await;
            match data.events.remove(id) {
                Some(event) => {
                    data.unindex_artist(&event);
                    true
                }
                None => false,
            }
        };

        if removed {
            self.persist().await?;
            tracing::debug!("Deleted event {}", id);
        }
        Ok(removed)
    }

    async fn query(&self, query: EventQuery) -> Result<Vec<Event>> {
        let data = self.data.read().await;
        let mut events: Vec<Event> = data
            .candidates(&query)
            .into_iter()
            .filter(|e| query.matches(e))
            .collect();
        drop(data);

        query.sort(&mut events);
        events.truncate(query.limit);
        Ok(events)
    }

    async fn add_attendee(&self, event_id: &str, user_id: &str) -> Result<Option<Event>> {
        let updated = {
            let mut data = self.data.write().await;
            match data.events.get_mut(event_id) {
                Some(event) => {
                    if !event.attendees.iter().any(|id| id == user_id) {
                        event.attendees.push(user_id.to_string());
                    }
                    event.attendee_count = event.attendees.len() as u32;
                    event.updated_at = Utc::now();
                    Some(event.clone())
                }
                None => None,
            }
        };

        if updated.is_some() {
            self.persist().await?;
        }
        Ok(updated)
    }

    async fn remove_attendee(&self, event_id: &str, user_id: &str) -> Result<Option<Event>> {
        let updated = {
            let mut data = self.data.write().await;
            match data.events.get_mut(event_id) {
                Some(event) => {
                    event.attendees.retain(|id| id != user_id);
                    event.attendee_count = event.attendees.len() as u32;
                    event.updated_at = Utc::now();
                    Some(event.clone())
                }
                None => None,
            }
        };

        if updated.is_some() {
            self.persist().await?;
        }
        Ok(updated)
    }

    async fn clear(&self) -> Result<()> {
        {
            let mut data = self.data.write().await;
            data.events.clear();
            data.by_artist.clear();
        }
        self.persist().await
    }
}
