//! Headless client-side tracker for bulk import jobs.
//!
//! Owns the canonical client view of one active import job:
//!
//! - Dual-transport progress delivery: a push subscription while
//!   connected, interval polling of the job status endpoint otherwise
//!   ([`delivery`], [`poller`]).
//! - Exactly-once side effects on status transitions (review gate
//!   opening, cache invalidation, auto-dismiss) ([`tracker`]).
//! - Durable local state that survives reloads, with terminal snapshots
//!   discarded on restore ([`state`]).
//! - The pre-upload preflight gate ([`preflight`]).
//!
//! The UI layer embedding this crate renders [`tracker::ImportTracker`]
//! state and calls its transition methods; it never talks to the
//! transports directly.

pub mod delivery;
pub mod poller;
pub mod preflight;
pub mod state;
pub mod tracker;

pub use poller::{PollError, StatusPoller};
pub use state::{ImportState, JsonFileStore, StateStore};
pub use tracker::{ImportTracker, PushSubscription, TrackerHooks};
