//! Validated mutation of an event's candidate windows.
//!
//! All checks run against the caller's snapshot before anything is changed;
//! the input event is never modified and a new copy is returned on success.
//! After every mutation the windows are sorted ascending by start.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::conflict::detect_excluding;
use crate::error::{CandidateClash, Result, SchedulingError};
use crate::event::{Event, EventStatus, InterviewDuration};
use crate::interval::{shift, CandidateInterval, TimeInterval, BUFFER_MINUTES};
use crate::policy::{ConflictScope, SameEventPolicy, SchedulingPolicy};

/// Add `new_slot` to `event`.
///
/// # Errors
/// - `SlotsLocked` if the event is not in `candidate` status.
/// - `ConfirmedConflict` if another event's confirmed meeting (buffered) overlaps.
/// - `CandidateConflict` if, under `ConfirmedAndCandidate` scope, another open
///   event's window overlaps, or if one of this event's own windows overlaps.
pub fn add_candidate(
    event: &Event,
    new_slot: CandidateInterval,
    all_events: &[Event],
    policy: &SchedulingPolicy,
) -> Result<Event> {
    screen(event, &new_slot, None, all_events, policy)?;

    let mut updated = event.clone();
    updated.candidate_slots.push(new_slot);
    updated.sort_candidate_slots();

    info!(event_id = %event.id, slot = %new_slot, "candidate window added");
    Ok(updated)
}

/// Replace the window at `index` with `new_slot`.
///
/// Same checks as [`add_candidate`], except the replaced window is left out of
/// the same-event comparison.
pub fn edit_candidate(
    event: &Event,
    index: usize,
    new_slot: CandidateInterval,
    all_events: &[Event],
    policy: &SchedulingPolicy,
) -> Result<Event> {
    check_index(event, index)?;
    screen(event, &new_slot, Some(index), all_events, policy)?;

    let mut updated = event.clone();
    updated.candidate_slots[index] = new_slot;
    updated.sort_candidate_slots();

    info!(event_id = %event.id, slot_index = index, slot = %new_slot, "candidate window edited");
    Ok(updated)
}

/// Drop the window at `index`. Removing time can never create a conflict, so
/// nothing is re-validated.
pub fn remove_candidate(event: &Event, index: usize) -> Result<Event> {
    check_index(event, index)?;

    let mut updated = event.clone();
    let removed = updated.candidate_slots.remove(index);

    info!(event_id = %event.id, slot_index = index, slot = %removed, "candidate window removed");
    Ok(updated)
}

/// Fill in a missing endpoint from the interview duration.
///
/// - both set: validated as-is
/// - only `start`: `end = start + duration`
/// - only `end`: `start = end - duration`
/// - neither: `Ok(None)`
///
/// The result still has to go through [`add_candidate`] or [`edit_candidate`].
pub fn derive_missing_endpoint(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    duration: InterviewDuration,
) -> Result<Option<TimeInterval>> {
    let minutes = duration.minutes();
    let interval = match (start, end) {
        (Some(start), Some(end)) => TimeInterval::new(start, end)?,
        (Some(start), None) => TimeInterval::starting_at(start, minutes)?,
        (None, Some(end)) => {
            let start = shift(end, -minutes).ok_or(SchedulingError::InvalidRange { start: end, end })?;
            TimeInterval::new(start, end)?
        }
        (None, None) => return Ok(None),
    };
    Ok(Some(interval))
}

fn check_index(event: &Event, index: usize) -> Result<()> {
    if index >= event.candidate_slots.len() {
        return Err(SchedulingError::NotFound {
            index,
            len: event.candidate_slots.len(),
        });
    }
    Ok(())
}

fn screen(
    event: &Event,
    new_slot: &CandidateInterval,
    skip_index: Option<usize>,
    all_events: &[Event],
    policy: &SchedulingPolicy,
) -> Result<()> {
    if event.status != EventStatus::Candidate {
        return Err(SchedulingError::SlotsLocked(event.status));
    }

    let interval = new_slot.interval();

    let confirmed = detect_excluding(interval, all_events, &event.id, ConflictScope::ConfirmedOnly);
    if confirmed.has_conflict {
        return Err(SchedulingError::ConfirmedConflict {
            conflicting_events: confirmed.conflicting_events,
        });
    }

    if policy.scope == ConflictScope::ConfirmedAndCandidate {
        // Confirmed hits were ruled out above, so anything left is a candidate window.
        let open = detect_excluding(interval, all_events, &event.id, policy.scope);
        if open.has_conflict {
            return Err(SchedulingError::CandidateConflict {
                clash: CandidateClash::OtherEvents(open.conflicting_events),
            });
        }
    }

    let buffer = match policy.same_event {
        SameEventPolicy::Unbuffered => 0,
        SameEventPolicy::Buffered => BUFFER_MINUTES,
    };
    let clash = event
        .candidate_slots
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip_index)
        .map(|(_, slot)| slot)
        .find(|slot| interval.overlaps(&slot.interval().with_buffer(buffer)));
    if let Some(slot) = clash {
        return Err(SchedulingError::CandidateConflict {
            clash: CandidateClash::SameEvent(*slot),
        });
    }

    Ok(())
}
