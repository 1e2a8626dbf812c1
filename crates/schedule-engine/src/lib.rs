//! # schedule-engine
//!
//! Interview scheduling and conflict detection for a job-hunting planner.
//!
//! Companies propose candidate windows for an interview; one window and an
//! exact start are later chosen and confirmed. Every existing appointment is
//! padded with a 30-minute buffer for travel and preparation, and no new window
//! or confirmed meeting may overlap another event's padded appointment.
//!
//! All engine functions are synchronous and pure over a caller-supplied
//! snapshot of events. [`service::ScheduleService`] wires them to an
//! [`store::EventStore`].
//!
//! ## Modules
//!
//! - [`interval`]: Half-open intervals, overlap and buffer arithmetic
//! - [`conflict`]: Buffered conflict detection against a snapshot
//! - [`candidates`]: Add/edit/remove candidate windows with validation
//! - [`confirmation`]: Confirm, revert, reject; start-time options
//! - [`policy`]: Conflict scope, same-event buffering, window-fit policies
//! - [`event`]: Event and company records
//! - [`config`]: TOML configuration
//! - [`format`]: Local-time rendering of slots
//! - [`store`]: Event-store port and in-memory implementation
//! - [`service`]: Store-backed operations
//! - [`error`]: Error types

pub mod candidates;
pub mod config;
pub mod confirmation;
pub mod conflict;
pub mod error;
pub mod event;
pub mod format;
pub mod interval;
pub mod policy;
pub mod service;
pub mod store;

pub use candidates::{add_candidate, derive_missing_endpoint, edit_candidate, remove_candidate};
pub use config::EngineConfig;
pub use confirmation::{confirm, confirm_at, reject, revert, start_time_options};
pub use conflict::{detect, detect_excluding, ConflictResult};
pub use error::{CandidateClash, ConflictReport, SchedulingError};
pub use event::{Company, Event, EventStatus, EventType, InterviewDuration, SelectionStage};
pub use interval::{overlaps, with_buffer, CandidateInterval, ConfirmedInterval, TimeInterval, BUFFER_MINUTES};
pub use policy::{ConflictScope, SameEventPolicy, SchedulingPolicy, WindowFitPolicy};
pub use service::ScheduleService;
pub use store::{EventStore, InMemoryEventStore, StoreChange};
