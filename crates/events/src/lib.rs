//! Progress event infrastructure for the import pipeline.
//!
//! Provides [`ProgressBus`], the in-process publish/subscribe hub the
//! background validator/committer publishes [`ProgressUpdate`]s into and
//! the WebSocket push layer fans out from.

pub mod bus;

pub use bus::ProgressBus;
pub use dpp_core::job::ProgressUpdate;
