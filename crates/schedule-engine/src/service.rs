//! Store-backed scheduling operations.
//!
//! Each call takes a fresh snapshot from the store, runs the pure engine over
//! it, and writes the result back only after every check has passed. Running
//! the same operation on the server against the latest persisted snapshot is
//! what makes a confirmation authoritative; client-side checks are advisory.
//! Mutations hold a write lock from snapshot to upsert, so two sessions going
//! through the same service cannot both pass a check against stale state.

use std::sync::Mutex;

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::candidates;
use crate::config::EngineConfig;
use crate::confirmation;
use crate::conflict::{self, ConflictResult};
use crate::error::{Result, SchedulingError};
use crate::event::Event;
use crate::interval::{CandidateInterval, TimeInterval};
use crate::policy::ConflictScope;
use crate::store::EventStore;

pub struct ScheduleService<S: EventStore> {
    store: S,
    config: EngineConfig,
    tz: Tz,
    write_lock: Mutex<()>,
}

impl<S: EventStore> ScheduleService<S> {
    /// # Errors
    /// Returns the config's validation error (bad timezone, zero grid).
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let tz = config.timezone()?;
        Ok(Self {
            store,
            config,
            tz,
            write_lock: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Screen an interval without changing anything.
    pub fn check(
        &self,
        interval: &TimeInterval,
        exclude_id: Option<&str>,
        scope: ConflictScope,
    ) -> Result<ConflictResult> {
        let snapshot = self.store.list()?;
        Ok(match exclude_id {
            Some(id) => conflict::detect_excluding(interval, &snapshot, id, scope),
            None => conflict::detect(interval, &snapshot, scope),
        })
    }

    pub fn add_candidate(&self, event_id: &str, slot: CandidateInterval) -> Result<Event> {
        let policy = self.config.policy;
        self.apply(event_id, "add_candidate", |event, snapshot| {
            candidates::add_candidate(event, slot, snapshot, &policy)
        })
    }

    /// Add a window where one endpoint may be missing; the other is derived from
    /// the configured default interview duration.
    pub fn add_candidate_from(
        &self,
        event_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Event> {
        let interval =
            candidates::derive_missing_endpoint(start, end, self.config.default_interview_duration)?
                .ok_or(SchedulingError::MissingEndpoint)?;
        self.add_candidate(event_id, interval.into())
    }

    pub fn edit_candidate(
        &self,
        event_id: &str,
        index: usize,
        slot: CandidateInterval,
    ) -> Result<Event> {
        let policy = self.config.policy;
        self.apply(event_id, "edit_candidate", |event, snapshot| {
            candidates::edit_candidate(event, index, slot, snapshot, &policy)
        })
    }

    pub fn remove_candidate(&self, event_id: &str, index: usize) -> Result<Event> {
        self.apply(event_id, "remove_candidate", |event, _| {
            candidates::remove_candidate(event, index)
        })
    }

    /// Confirm at a local time of day on the chosen window's date.
    pub fn confirm(&self, event_id: &str, slot_index: usize, time: NaiveTime) -> Result<Event> {
        let fit = self.config.policy.window_fit;
        let tz = self.tz;
        self.apply(event_id, "confirm", |event, snapshot| {
            confirmation::confirm(event, slot_index, time, snapshot, fit, tz)
        })
    }

    /// Persist a confirmed slot submitted by a client, re-validating it against
    /// the latest snapshot: duration, window fit, and confirmed-only conflicts.
    pub fn confirm_slot(&self, event_id: &str, slot: TimeInterval) -> Result<Event> {
        let fit = self.config.policy.window_fit;
        self.apply(event_id, "confirm_slot", |event, snapshot| {
            confirmation::validate_confirmed_slot(event, &slot, fit)?;
            let index = event
                .candidate_slots
                .iter()
                .position(|w| {
                    confirmation::fits_window(w.interval(), slot.start(), event.interview_duration, fit)
                })
                .ok_or(SchedulingError::NotFound {
                    index: 0,
                    len: event.candidate_slots.len(),
                })?;
            confirmation::confirm_at(event, index, slot.start(), snapshot, fit)
        })
    }

    pub fn revert(&self, event_id: &str) -> Result<Event> {
        self.apply(event_id, "revert", |event, _| confirmation::revert(event))
    }

    pub fn reject(&self, event_id: &str) -> Result<Event> {
        self.apply(event_id, "reject", |event, _| confirmation::reject(event))
    }

    /// Legal start times for the window at `slot_index`, on the configured grid.
    pub fn start_time_options(&self, event_id: &str, slot_index: usize) -> Result<Vec<DateTime<Utc>>> {
        let event = self
            .store
            .get(event_id)?
            .ok_or_else(|| SchedulingError::EventNotFound(event_id.to_string()))?;
        let window = event
            .candidate_slots
            .get(slot_index)
            .ok_or(SchedulingError::NotFound {
                index: slot_index,
                len: event.candidate_slots.len(),
            })?;
        confirmation::start_time_options(
            window.interval(),
            event.interview_duration,
            self.config.grid_minutes,
            self.config.policy.window_fit,
        )
    }

    fn apply<F>(&self, event_id: &str, operation: &str, op: F) -> Result<Event>
    where
        F: FnOnce(&Event, &[Event]) -> Result<Event>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| SchedulingError::Store("write lock poisoned".to_string()))?;

        let snapshot = self.store.list()?;
        let event = snapshot
            .iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| SchedulingError::EventNotFound(event_id.to_string()))?;

        match op(event, &snapshot) {
            Ok(updated) => {
                self.store.upsert(updated.clone())?;
                Ok(updated)
            }
            Err(err) => {
                warn!(
                    event_id,
                    operation,
                    conflicts = err.conflicting_events().len(),
                    error = %err,
                    "scheduling operation rejected"
                );
                Err(err)
            }
        }
    }
}
