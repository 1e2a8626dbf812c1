//! Policy switches for the variation points of conflict checking.

use serde::{Deserialize, Serialize};

/// Which existing intervals a new interval is screened against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Only other events' confirmed meetings block time.
    #[default]
    ConfirmedOnly,
    /// Confirmed meetings plus the candidate windows of events still in
    /// `candidate` status.
    ConfirmedAndCandidate,
}

/// How a new window is compared with the other windows of the same event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameEventPolicy {
    /// Reject only direct overlap.
    #[default]
    Unbuffered,
    /// Reject overlap with the buffered window (30 minutes either side).
    Buffered,
}

/// How a confirmed meeting must sit inside its candidate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFitPolicy {
    /// Start and end both inside the window; latest start is `end - duration`.
    #[default]
    Strict,
    /// Only the start has to be inside `[start, end]`; the meeting may run past
    /// the window's end.
    EndInclusive,
}

/// The three policies bundled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
    pub scope: ConflictScope,
    pub same_event: SameEventPolicy,
    pub window_fit: WindowFitPolicy,
}
