//! Detect buffered overlaps between a proposed interval and existing events.
//!
//! Every existing interval is widened by [`BUFFER_MINUTES`] on both sides before
//! the half-open overlap test. Adjacent intervals (one ends exactly where the
//! buffered other starts) are NOT conflicts.

use serde::Serialize;
use tracing::debug;

use crate::event::Event;
use crate::interval::{TimeInterval, BUFFER_MINUTES};
use crate::policy::ConflictScope;

/// Outcome of screening one interval against a snapshot of events.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConflictResult {
    pub has_conflict: bool,
    /// Distinct events that block the interval, in snapshot order.
    pub conflicting_events: Vec<Event>,
}

impl ConflictResult {
    pub fn first(&self) -> Option<&Event> {
        self.conflicting_events.first()
    }
}

/// Screen `candidate` against `events` with the standard 30-minute buffer.
///
/// Confirmed meetings are always checked. Under
/// [`ConflictScope::ConfirmedAndCandidate`], each candidate window of events
/// that are still open (candidate status, nothing confirmed) is checked too.
/// Each event appears at most once in the result.
///
/// The event being edited must not be in `events`; see [`detect_excluding`].
pub fn detect(candidate: &TimeInterval, events: &[Event], scope: ConflictScope) -> ConflictResult {
    detect_with_buffer(candidate, events, scope, BUFFER_MINUTES)
}

/// [`detect`] with an explicit buffer, in minutes.
pub fn detect_with_buffer(
    candidate: &TimeInterval,
    events: &[Event],
    scope: ConflictScope,
    buffer_minutes: i64,
) -> ConflictResult {
    collect(candidate, events.iter(), scope, buffer_minutes)
}

/// [`detect`] over every event except `exclude_id`, so that an event never
/// conflicts with its own earlier state.
pub fn detect_excluding(
    candidate: &TimeInterval,
    events: &[Event],
    exclude_id: &str,
    scope: ConflictScope,
) -> ConflictResult {
    collect(
        candidate,
        events.iter().filter(|e| e.id != exclude_id),
        scope,
        BUFFER_MINUTES,
    )
}

fn collect<'a>(
    candidate: &TimeInterval,
    events: impl Iterator<Item = &'a Event>,
    scope: ConflictScope,
    buffer_minutes: i64,
) -> ConflictResult {
    let conflicting_events: Vec<Event> = events
        .filter(|event| blocks(candidate, event, scope, buffer_minutes))
        .cloned()
        .collect();

    ConflictResult {
        has_conflict: !conflicting_events.is_empty(),
        conflicting_events,
    }
}

fn blocks(candidate: &TimeInterval, event: &Event, scope: ConflictScope, buffer_minutes: i64) -> bool {
    if let Some(confirmed) = event.confirmed_slot.filter(|_| event.is_confirmed()) {
        if candidate.overlaps(&confirmed.interval().with_buffer(buffer_minutes)) {
            debug!(event_id = %event.id, slot = %confirmed, "confirmed slot blocks interval");
            return true;
        }
    }

    if scope == ConflictScope::ConfirmedAndCandidate && event.is_open_candidate() {
        let hit = event
            .candidate_slots
            .iter()
            .find(|slot| candidate.overlaps(&slot.interval().with_buffer(buffer_minutes)));
        if let Some(slot) = hit {
            debug!(event_id = %event.id, slot = %slot, "candidate window blocks interval");
            return true;
        }
    }

    false
}
