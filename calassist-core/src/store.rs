//! Local event storage.
//!
//! Events live in memory and are written to one JSON file (an array of event
//! objects) after every mutation. There is no journal: the whole file is
//! rewritten each time.
//!
//! A failed write is reported but the in-memory change stays applied, so the
//! next successful write catches the file up. A missing file is an empty
//! store; an unreadable one is reported and leaves the store empty.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config::Config;
use crate::conflict::ConflictDetector;
use crate::error::{CalAssistError, CalAssistResult, StoreIoError};
use crate::event::{CalendarEvent, EventPatch, NewEvent};
use crate::query::{EventQuery, QueryEngine};
use crate::time::{EventTime, Normalizer};

pub struct EventStore {
    path: PathBuf,
    normalizer: Normalizer,
    events: Vec<CalendarEvent>,
}

impl EventStore {
    /// Open the store configured in `config`, loading whatever is on disk.
    pub fn open(config: &Config) -> Self {
        Self::open_at(&config.data_file, config.normalizer)
    }

    /// Open a store at `path`. Load failures are logged and leave the store empty.
    pub fn open_at(path: impl Into<PathBuf>, normalizer: Normalizer) -> Self {
        let mut store = EventStore {
            path: path.into(),
            normalizer,
            events: Vec::new(),
        };
        if let Err(e) = store.load() {
            tracing::warn!(error = %e, "starting with an empty event store");
        }
        store
    }

    /// Replace the in-memory set with the file's contents.
    ///
    /// Returns the number of events loaded. On error the set is empty.
    pub fn load(&mut self) -> CalAssistResult<usize> {
        self.events.clear();

        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no event file yet");
            return Ok(0);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| self.load_failed(e))?;
        if content.trim().is_empty() {
            return Ok(0);
        }

        let loaded: Vec<CalendarEvent> =
            serde_json::from_str(&content).map_err(|e| self.load_failed(e))?;

        let mut seen_ids = HashSet::new();
        for event in loaded {
            if seen_ids.insert(event.id.clone()) {
                self.events.push(event);
            } else {
                tracing::warn!(id = %event.id, "dropping event with duplicate id");
            }
        }

        tracing::debug!(path = %self.path.display(), count = self.events.len(), "loaded events");
        Ok(self.events.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// All events in insertion order.
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Validate and add a new event, then persist.
    pub fn create(&mut self, fields: NewEvent) -> CalAssistResult<CalendarEvent> {
        let event = CalendarEvent::create(fields, &self.normalizer, Utc::now())?;

        self.events.push(event.clone());
        tracing::info!(id = %event.id, title = %event.title, "created event");
        self.persist()?;

        Ok(event)
    }

    pub fn get(&self, id: &str) -> CalAssistResult<&CalendarEvent> {
        self.events
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| CalAssistError::NotFound(id.to_string()))
    }

    /// Apply `patch` to the event with `id`. The merged record is validated as
    /// a whole; on failure nothing changes.
    pub fn update(&mut self, id: &str, patch: &EventPatch) -> CalAssistResult<CalendarEvent> {
        let index = self.index_of(id)?;
        let updated = self.events[index].patched(patch, &self.normalizer, Utc::now())?;

        self.events[index] = updated.clone();
        tracing::info!(id = %id, "updated event");
        self.persist()?;

        Ok(updated)
    }

    /// Remove the event with `id` and return it.
    pub fn delete(&mut self, id: &str) -> CalAssistResult<CalendarEvent> {
        let index = self.index_of(id)?;
        let removed = self.events.remove(index);

        tracing::info!(id = %id, title = %removed.title, "deleted event");
        self.persist()?;

        Ok(removed)
    }

    /// Events matching `query`, ascending by start.
    pub fn query(&self, query: &EventQuery) -> Vec<CalendarEvent> {
        QueryEngine::new(self.normalizer)
            .filter(&self.events, query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Stored events overlapping `[start, end)`, optionally ignoring one id.
    pub fn conflicts(
        &self,
        start: &EventTime,
        end: &EventTime,
        exclude_id: Option<&str>,
    ) -> Vec<&CalendarEvent> {
        let detector = ConflictDetector::new(&self.normalizer);
        match exclude_id {
            Some(id) => detector.excluding(id).find_conflicts(start, end, &self.events),
            None => detector.find_conflicts(start, end, &self.events),
        }
    }

    /// Record the id of the remote copy of an event. Does not count as an
    /// edit, so `updated_at` is left alone.
    pub fn link_remote(&mut self, id: &str, remote_id: &str) -> CalAssistResult<()> {
        let index = self.index_of(id)?;
        self.events[index].remote_id = Some(remote_id.to_string());
        self.persist()
    }

    fn index_of(&self, id: &str) -> CalAssistResult<usize> {
        self.events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CalAssistError::NotFound(id.to_string()))
    }

    fn persist(&self) -> CalAssistResult<()> {
        let content = serde_json::to_string_pretty(&self.events)
            .map_err(|e| CalAssistError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.persist_failed(e))?;
        }
        std::fs::write(&self.path, content).map_err(|e| self.persist_failed(e))?;

        tracing::debug!(path = %self.path.display(), count = self.events.len(), "persisted events");
        Ok(())
    }

    fn load_failed(&self, e: impl std::fmt::Display) -> CalAssistError {
        StoreIoError::LoadFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        }
        .into()
    }

    fn persist_failed(&self, e: impl std::fmt::Display) -> CalAssistError {
        let err: CalAssistError = StoreIoError::PersistFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        }
        .into();
        tracing::warn!(error = %err, "in-memory events are ahead of the file");
        err
    }
}
