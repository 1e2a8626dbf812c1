//! Error types for scheduling operations.
//!
//! Every variant is an expected, user-correctable condition. Nothing in the
//! engine panics on bad input; callers render the message and let the user pick
//! a different time.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::event::{Event, EventStatus};
use crate::interval::{CandidateInterval, TimeInterval, BUFFER_MINUTES};

/// What a rejected candidate window collided with.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateClash {
    /// Still-open candidate windows of other events.
    OtherEvents(Vec<Event>),
    /// Another window already on the same event.
    SameEvent(CandidateInterval),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("Invalid time range: start {start} must be before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("{}", confirmed_conflict_message(.conflicting_events))]
    ConfirmedConflict { conflicting_events: Vec<Event> },

    #[error("{}", candidate_conflict_message(.clash))]
    CandidateConflict { clash: CandidateClash },

    #[error("Chosen time {start} - {end} does not fit the candidate window {window}")]
    OutOfWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        window: TimeInterval,
    },

    #[error("A start or an end time is required")]
    MissingEndpoint,

    #[error("Candidate slot {index} not found (event has {len} slots)")]
    NotFound { index: usize, len: usize },

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Interview duration {0} minutes is outside the allowed 15-300 minutes")]
    InvalidDuration(i64),

    #[error("Start-time grid must be at least one minute, got {0}")]
    InvalidGrid(u32),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local time {0} does not exist in the configured timezone")]
    InvalidLocalTime(NaiveDateTime),

    #[error("Candidate windows of a {0} event cannot be changed")]
    SlotsLocked(EventStatus),

    #[error("Cannot move event from {from} to {to}")]
    InvalidTransition { from: EventStatus, to: EventStatus },

    #[error("Confirmed slot lasts {actual} minutes but the interview is {expected} minutes")]
    DurationMismatch { expected: i64, actual: i64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event store error: {0}")]
    Store(String),
}

impl SchedulingError {
    /// Events that caused a conflict, if this is a conflict error.
    pub fn conflicting_events(&self) -> &[Event] {
        match self {
            SchedulingError::ConfirmedConflict { conflicting_events } => conflicting_events,
            SchedulingError::CandidateConflict {
                clash: CandidateClash::OtherEvents(events),
            } => events,
            _ => &[],
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            SchedulingError::ConfirmedConflict { .. } | SchedulingError::CandidateConflict { .. }
        )
    }
}

/// Serializable `{message, conflicting_events}` view of an error, handed to
/// whatever renders it.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    pub message: String,
    pub conflicting_events: Vec<Event>,
}

impl From<&SchedulingError> for ConflictReport {
    fn from(err: &SchedulingError) -> Self {
        Self {
            message: err.to_string(),
            conflicting_events: err.conflicting_events().to_vec(),
        }
    }
}

fn describe(event: &Event) -> String {
    format!("'{}' ({})", event.company_name, event.title)
}

fn confirmed_conflict_message(events: &[Event]) -> String {
    match events.first() {
        Some(first) => format!(
            "This time overlaps the confirmed schedule of {} (a {}-minute buffer is applied before and after)",
            describe(first),
            BUFFER_MINUTES
        ),
        None => "This time overlaps a confirmed schedule".to_string(),
    }
}

fn candidate_conflict_message(clash: &CandidateClash) -> String {
    match clash {
        CandidateClash::OtherEvents(events) => match events.first() {
            Some(first) => format!(
                "This time overlaps the candidate windows of {} (a {}-minute buffer is applied before and after)",
                describe(first),
                BUFFER_MINUTES
            ),
            None => "This time overlaps another event's candidate windows".to_string(),
        },
        CandidateClash::SameEvent(slot) => {
            format!("This time overlaps the already added candidate window {}", slot)
        }
    }
}

/// Convenience alias used throughout schedule-engine.
pub type Result<T> = std::result::Result<T, SchedulingError>;
