//! Turn a candidate window plus a chosen start into a confirmed meeting.
//!
//! The confirmed interval is always `start .. start + interview_duration`. It
//! is re-screened against every *other* event's confirmed meeting (30-minute
//! buffer) before the event is updated. Candidate windows of other events never
//! block a confirmation.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::conflict::detect_excluding;
use crate::error::{Result, SchedulingError};
use crate::event::{Event, EventStatus, InterviewDuration};
use crate::interval::{shift, ConfirmedInterval, TimeInterval};
use crate::policy::{ConflictScope, WindowFitPolicy};

/// Confirm `event` at `time` (local time of day in `tz`) on the date of the
/// candidate window at `slot_index`.
///
/// # Errors
/// See [`confirm_at`]; additionally `InvalidLocalTime` when the combined local
/// time falls in a DST gap.
pub fn confirm(
    event: &Event,
    slot_index: usize,
    time: NaiveTime,
    all_events: &[Event],
    window_fit: WindowFitPolicy,
    tz: Tz,
) -> Result<Event> {
    let window = candidate_window(event, slot_index)?;
    let start = combine_date_and_time(window.start(), time, tz)?;
    confirm_at(event, slot_index, start, all_events, window_fit)
}

/// Confirm `event` starting exactly at `start` inside the candidate window at
/// `slot_index`.
///
/// # Errors
/// - `InvalidTransition` if the event is `rejected`.
/// - `NotFound` if `slot_index` is out of range.
/// - `OutOfWindow` if the meeting does not fit the window under `window_fit`.
/// - `ConfirmedConflict` if another event's confirmed meeting (buffered) overlaps.
pub fn confirm_at(
    event: &Event,
    slot_index: usize,
    start: DateTime<Utc>,
    all_events: &[Event],
    window_fit: WindowFitPolicy,
) -> Result<Event> {
    ensure_transition(event, EventStatus::Confirmed)?;
    let window = candidate_window(event, slot_index)?;

    let confirmed = ConfirmedInterval::from(TimeInterval::starting_at(
        start,
        event.interview_duration.minutes(),
    )?);
    if !fits_window(&window, start, event.interview_duration, window_fit) {
        return Err(SchedulingError::OutOfWindow {
            start,
            end: confirmed.end(),
            window,
        });
    }

    let result = detect_excluding(
        confirmed.interval(),
        all_events,
        &event.id,
        ConflictScope::ConfirmedOnly,
    );
    if result.has_conflict {
        return Err(SchedulingError::ConfirmedConflict {
            conflicting_events: result.conflicting_events,
        });
    }

    let mut updated = event.clone();
    updated.confirmed_slot = Some(confirmed);
    updated.status = EventStatus::Confirmed;

    info!(event_id = %event.id, slot = %confirmed, "event confirmed");
    Ok(updated)
}

/// Back to `candidate`: clears the confirmed meeting, keeps the windows.
pub fn revert(event: &Event) -> Result<Event> {
    ensure_transition(event, EventStatus::Candidate)?;

    let mut updated = event.clone();
    updated.confirmed_slot = None;
    updated.status = EventStatus::Candidate;

    info!(event_id = %event.id, "event reverted to candidate");
    Ok(updated)
}

/// Cancel the event. Windows are kept for display; they no longer block
/// anything.
pub fn reject(event: &Event) -> Result<Event> {
    ensure_transition(event, EventStatus::Rejected)?;

    let mut updated = event.clone();
    updated.confirmed_slot = None;
    updated.status = EventStatus::Rejected;

    info!(event_id = %event.id, "event rejected");
    Ok(updated)
}

/// Check a confirmed slot submitted from outside (e.g. a confirm request)
/// against the event it is meant for: the length must equal the interview
/// duration and the meeting must fit at least one candidate window.
pub fn validate_confirmed_slot(
    event: &Event,
    slot: &TimeInterval,
    window_fit: WindowFitPolicy,
) -> Result<()> {
    let expected = event.interview_duration.minutes();
    let actual = slot.duration_minutes();
    if actual != expected {
        return Err(SchedulingError::DurationMismatch { expected, actual });
    }

    let fits_any = event
        .candidate_slots
        .iter()
        .any(|w| fits_window(w.interval(), slot.start(), event.interview_duration, window_fit));
    if fits_any {
        return Ok(());
    }

    // Report the window the start falls after, or the first one.
    let nearest = event
        .candidate_slots
        .iter()
        .rev()
        .find(|w| w.start() <= slot.start())
        .or_else(|| event.candidate_slots.first());
    match nearest {
        Some(window) => Err(SchedulingError::OutOfWindow {
            start: slot.start(),
            end: slot.end(),
            window: *window.interval(),
        }),
        None => Err(SchedulingError::NotFound { index: 0, len: 0 }),
    }
}

/// The last legal start in `window` for a meeting of `duration`, or `None` when
/// the meeting cannot fit at all.
pub fn latest_start(
    window: &TimeInterval,
    duration: InterviewDuration,
    window_fit: WindowFitPolicy,
) -> Option<DateTime<Utc>> {
    let latest = match window_fit {
        WindowFitPolicy::Strict => shift(window.end(), -duration.minutes())?,
        WindowFitPolicy::EndInclusive => window.end(),
    };
    (latest >= window.start()).then_some(latest)
}

/// Whether a meeting of `duration` starting at `start` is legal in `window`.
pub fn fits_window(
    window: &TimeInterval,
    start: DateTime<Utc>,
    duration: InterviewDuration,
    window_fit: WindowFitPolicy,
) -> bool {
    match latest_start(window, duration, window_fit) {
        Some(latest) => window.start() <= start && start <= latest,
        None => false,
    }
}

/// Every legal start in `window`, stepping `grid_minutes` from the window's
/// start up to [`latest_start`] inclusive.
///
/// # Errors
/// Returns `SchedulingError::InvalidGrid` when `grid_minutes` is zero.
pub fn start_time_options(
    window: &TimeInterval,
    duration: InterviewDuration,
    grid_minutes: u32,
    window_fit: WindowFitPolicy,
) -> Result<Vec<DateTime<Utc>>> {
    if grid_minutes == 0 {
        return Err(SchedulingError::InvalidGrid(grid_minutes));
    }
    let Some(latest) = latest_start(window, duration, window_fit) else {
        return Ok(Vec::new());
    };

    let step = i64::from(grid_minutes);
    let mut options = Vec::new();
    let mut cursor = Some(window.start());
    while let Some(start) = cursor.filter(|c| *c <= latest) {
        options.push(start);
        cursor = shift(start, step);
    }
    Ok(options)
}

/// The instant at local `time` on the local calendar date of `anchor` in `tz`.
///
/// Ambiguous local times (DST fold) resolve to the earlier instant.
pub fn combine_date_and_time(anchor: DateTime<Utc>, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>> {
    let local = anchor.with_timezone(&tz).date_naive().and_time(time);
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(SchedulingError::InvalidLocalTime(local))
}

fn candidate_window(event: &Event, index: usize) -> Result<TimeInterval> {
    event
        .candidate_slots
        .get(index)
        .map(|slot| *slot.interval())
        .ok_or(SchedulingError::NotFound {
            index,
            len: event.candidate_slots.len(),
        })
}

fn ensure_transition(event: &Event, to: EventStatus) -> Result<()> {
    if !event.status.can_transition_to(to) {
        return Err(SchedulingError::InvalidTransition {
            from: event.status,
            to,
        });
    }
    Ok(())
}
