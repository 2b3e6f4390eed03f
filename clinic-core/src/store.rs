//! Calendar event store persisted as one JSON blob under a single key.
//!
//! Every mutation is a full read-modify-write of the whole collection. There is
//! no concurrency control: two writers interleaving `load` and `save` lose the
//! earlier write.
//!
//! Records that pass through a `load`/`save` cycle unchanged are written back
//! in the exact JSON text they were read from, so blobs written by the web app
//! keep their `null`s, empty lists and millisecond timestamps.

use std::cell::RefCell;

use chrono::{DateTime, Duration, Utc};
use serde_json::value::RawValue;
use tracing::{debug, error, warn};

use crate::config::{CalendarConfig, TransitionPolicy};
use crate::error::ClinicError;
use crate::event::{CalendarEvent, EventPatch};
use crate::storage::KeyValueStore;

/// Source of "now" for timestamps stamped by the store and the calendar view.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

pub struct EventStore<S> {
    storage: S,
    key: String,
    seed: Vec<CalendarEvent>,
    policy: TransitionPolicy,
    clock: Box<dyn Clock>,
    /// Records of the last successful `load`, each with its stored text.
    decoded: RefCell<Vec<(CalendarEvent, Box<RawValue>)>>,
}

fn decode(raw: &str) -> serde_json::Result<Vec<(CalendarEvent, Box<RawValue>)>> {
    let records: Vec<Box<RawValue>> = serde_json::from_str(raw)?;
    records
        .into_iter()
        .map(|record| Ok((serde_json::from_str(record.get())?, record)))
        .collect()
}

impl<S: KeyValueStore> EventStore<S> {
    /// Store with the default key and the permissive transition policy.
    pub fn new(storage: S, seed: Vec<CalendarEvent>) -> Self {
        Self::with_config(storage, seed, &CalendarConfig::default())
    }

    pub fn with_config(storage: S, seed: Vec<CalendarEvent>, config: &CalendarConfig) -> Self {
        Self {
            storage,
            key: config.storage_key.clone(),
            seed,
            policy: config.transition_policy,
            clock: Box::new(SystemClock),
            decoded: RefCell::new(Vec::new()),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn seed(&self) -> &[CalendarEvent] {
        &self.seed
    }

    /// Persists the seed once when nothing is stored yet.
    pub fn initialize(&self) {
        match self.storage.get_item(&self.key) {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!(key = %self.key, "seeding calendar storage");
                self.save(&self.seed);
            }
            Err(err) => warn!(key = %self.key, %err, "cannot inspect calendar storage"),
        }
    }

    /// Persisted events, or the seed when nothing readable is stored.
    pub fn load(&self) -> Vec<CalendarEvent> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.seed.clone(),
            Err(err) => {
                error!(key = %self.key, %err, "failed to read calendar events, using seed data");
                return self.seed.clone();
            }
        };

        match decode(&raw) {
            Ok(records) => {
                let events = records.iter().map(|(event, _)| event.clone()).collect();
                *self.decoded.borrow_mut() = records;
                events
            }
            Err(err) => {
                error!(key = %self.key, %err, "failed to parse calendar events, using seed data");
                self.decoded.borrow_mut().clear();
                self.seed.clone()
            }
        }
    }

    /// Overwrites the whole collection. Failures are logged, never returned.
    pub fn save(&self, events: &[CalendarEvent]) {
        if !self.storage.is_available() {
            return;
        }

        let raw = match self.encode(events) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "failed to serialize calendar events");
                return;
            }
        };

        if let Err(err) = self.storage.set_item(&self.key, &raw) {
            warn!(key = %self.key, %err, "failed to persist calendar events");
        }
    }

    pub fn add(&self, event: CalendarEvent) -> Result<CalendarEvent, ClinicError> {
        if !event.has_valid_range() {
            return Err(ClinicError::InvalidTimeRange { id: event.id });
        }

        let mut events = self.load();
        if events.iter().any(|existing| existing.id == event.id) {
            return Err(ClinicError::DuplicateId(event.id));
        }

        debug!(id = %event.id, kind = %event.event_type, "adding calendar event");
        events.push(event.clone());
        self.save(&events);
        Ok(event)
    }

    /// Merges `patch` into the event with `id`. `Ok(None)` when no such event exists.
    pub fn update(
        &self,
        id: &str,
        patch: EventPatch,
    ) -> Result<Option<CalendarEvent>, ClinicError> {
        let mut events = self.load();
        let Some(slot) = events.iter_mut().find(|event| event.id == id) else {
            return Ok(None);
        };

        if let Some(next) = patch.status {
            if !self.policy.allows(slot.status, next) {
                return Err(ClinicError::InvalidTransition {
                    id: id.to_string(),
                    from: slot.status,
                    to: next,
                });
            }
        }

        let mut updated = slot.clone();
        updated.apply(patch);
        if !updated.has_valid_range() {
            return Err(ClinicError::InvalidTimeRange { id: id.to_string() });
        }
        updated.updated_at = self.next_stamp(slot.updated_at);

        *slot = updated.clone();
        debug!(id, status = %updated.status, "updated calendar event");
        self.save(&events);
        Ok(Some(updated))
    }

    /// Removes the event with `id`; returns whether anything was removed.
    pub fn delete(&self, id: &str) -> bool {
        let mut events = self.load();
        let before = events.len();
        events.retain(|event| event.id != id);

        if events.len() == before {
            return false;
        }

        debug!(id, "deleted calendar event");
        self.save(&events);
        true
    }

    /// Restores the seed, discarding every local change.
    pub fn reset(&self) {
        debug!(key = %self.key, "resetting calendar storage to seed data");
        self.save(&self.seed);
    }

    pub fn find(&self, id: &str) -> Option<CalendarEvent> {
        self.load().into_iter().find(|event| event.id == id)
    }

    fn encode(&self, events: &[CalendarEvent]) -> serde_json::Result<String> {
        let decoded = self.decoded.borrow();
        let records = events
            .iter()
            .map(|event| match decoded.iter().find(|(known, _)| known == event) {
                Some((_, record)) => Ok(record.clone()),
                None => serde_json::value::to_raw_value(event),
            })
            .collect::<serde_json::Result<Vec<_>>>()?;
        serde_json::to_string(&records)
    }

    // Update stamps must move forward even when the clock has not.
    fn next_stamp(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.now();
        let floor = previous + Duration::milliseconds(1);
        now.max(floor)
    }
}
