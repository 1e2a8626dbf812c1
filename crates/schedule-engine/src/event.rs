//! Event and company records as the engine sees them.
//!
//! The persistence layer owns these; the engine only reads snapshots and
//! returns updated copies.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SchedulingError};
use crate::interval::{CandidateInterval, ConfirmedInterval};

/// Lifecycle of an event: `candidate` -> `confirmed` -> back to `candidate`,
/// and `rejected` (terminal) from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Candidate,
    Confirmed,
    Rejected,
}

impl EventStatus {
    /// Whether the state machine allows moving from `self` to `to`.
    ///
    /// `confirmed -> confirmed` is a reschedule; `candidate -> candidate` is a
    /// no-op revert. Nothing leaves `rejected`.
    pub fn can_transition_to(self, to: EventStatus) -> bool {
        use EventStatus::*;
        matches!(
            (self, to),
            (Candidate, Candidate)
                | (Candidate, Confirmed)
                | (Candidate, Rejected)
                | (Confirmed, Confirmed)
                | (Confirmed, Candidate)
                | (Confirmed, Rejected)
        )
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventStatus::Candidate => "candidate",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    Interview,
    InfoSession,
    GroupDiscussion,
    FinalInterview,
    Meeting,
}

/// Where a company stands in its selection process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStage {
    #[default]
    DocumentReview,
    FirstInterview,
    SecondInterview,
    FinalInterview,
    Offer,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub current_stage: SelectionStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Length of the actual meeting once confirmed, in minutes (15..=300).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct InterviewDuration(i64);

impl InterviewDuration {
    pub const MIN_MINUTES: i64 = 15;
    pub const MAX_MINUTES: i64 = 300;
    pub const DEFAULT_MINUTES: i64 = 30;

    /// # Errors
    /// Returns `SchedulingError::InvalidDuration` outside 15..=300 minutes.
    pub fn new(minutes: i64) -> Result<Self> {
        if !(Self::MIN_MINUTES..=Self::MAX_MINUTES).contains(&minutes) {
            return Err(SchedulingError::InvalidDuration(minutes));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> i64 {
        self.0
    }

    pub fn as_duration(self) -> chrono::Duration {
        chrono::Duration::minutes(self.0)
    }
}

impl Default for InterviewDuration {
    fn default() -> Self {
        Self(Self::DEFAULT_MINUTES)
    }
}

impl TryFrom<i64> for InterviewDuration {
    type Error = SchedulingError;

    fn try_from(minutes: i64) -> Result<Self> {
        Self::new(minutes)
    }
}

impl From<InterviewDuration> for i64 {
    fn from(duration: InterviewDuration) -> i64 {
        duration.0
    }
}

/// A scheduled interaction with one company.
///
/// `candidate_slots` is kept sorted by start; `confirmed_slot` is present iff
/// `status == Confirmed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub company_id: String,
    pub company_name: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub candidate_slots: Vec<CandidateInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_slot: Option<ConfirmedInterval>,
    #[serde(default)]
    pub interview_duration: InterviewDuration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Event {
    /// A fresh `candidate` event with no windows yet.
    pub fn new(
        id: impl Into<String>,
        company_id: impl Into<String>,
        company_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            company_name: company_name.into(),
            title: title.into(),
            event_type: EventType::default(),
            status: EventStatus::Candidate,
            candidate_slots: Vec::new(),
            confirmed_slot: None,
            interview_duration: InterviewDuration::default(),
            location: None,
            is_online: false,
            notes: None,
        }
    }

    /// Label the event with its company record.
    pub fn for_company(id: impl Into<String>, company: &Company, title: impl Into<String>) -> Self {
        Self::new(id, company.id.clone(), company.name.clone(), title)
    }

    pub fn with_duration(mut self, duration: InterviewDuration) -> Self {
        self.interview_duration = duration;
        self
    }

    pub fn with_candidate_slots(mut self, slots: Vec<CandidateInterval>) -> Self {
        self.candidate_slots = slots;
        self.sort_candidate_slots();
        self
    }

    /// Mark the event confirmed at `slot` without any validation. Meant for
    /// loading existing records and building fixtures; use
    /// [`crate::confirmation::confirm`] for user-driven confirmation.
    pub fn with_confirmed_slot(mut self, slot: ConfirmedInterval) -> Self {
        self.confirmed_slot = Some(slot);
        self.status = EventStatus::Confirmed;
        self
    }

    /// Confirmed status with a meeting time set.
    pub fn is_confirmed(&self) -> bool {
        self.status == EventStatus::Confirmed && self.confirmed_slot.is_some()
    }

    /// Still open for scheduling: candidate status and nothing confirmed.
    pub fn is_open_candidate(&self) -> bool {
        self.status == EventStatus::Candidate && self.confirmed_slot.is_none()
    }

    pub(crate) fn sort_candidate_slots(&mut self) {
        self.candidate_slots
            .sort_by_key(|slot| (slot.start(), slot.end()));
    }
}

/// Parse a JSON array of events (the persistence layer's wire format).
///
/// A `confirmed` record must carry `confirmed_slot`; any other status has it
/// dropped.
pub fn events_from_json(json: &str) -> Result<Vec<Event>> {
    let mut events: Vec<Event> = serde_json::from_str(json)
        .map_err(|e| SchedulingError::Store(format!("Invalid events JSON: {}", e)))?;
    for event in &mut events {
        event.sort_candidate_slots();
        match (event.status, event.confirmed_slot) {
            (EventStatus::Confirmed, None) => {
                return Err(SchedulingError::Store(format!(
                    "Event {} is confirmed but has no confirmed_slot",
                    event.id
                )));
            }
            (EventStatus::Candidate | EventStatus::Rejected, Some(stale)) => {
                warn!(event_id = %event.id, status = %event.status, slot = %stale, "dropping confirmed_slot of unconfirmed event");
                event.confirmed_slot = None;
            }
            _ => {}
        }
    }
    Ok(events)
}

/// Serialize events back to pretty-printed JSON.
pub fn events_to_json(events: &[Event]) -> Result<String> {
    serde_json::to_string_pretty(events)
        .map_err(|e| SchedulingError::Store(format!("Serialization error: {}", e)))
}
