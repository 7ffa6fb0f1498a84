//! Transport selection predicates.
//!
//! This module has zero external dependencies. Two small decisions live
//! here so the tracker's run loop stays readable:
//!
//! - whether the job still needs progress delivery at all, and
//! - whether the polling fallback should run right now.
//!
//! Push and poll are alternatives, never concurrent: while the push
//! subscription reports connected the poll timer stays idle, and vice
//! versa. Duplicate delivery across a transport switch is harmless
//! because updates are idempotent.

use dpp_core::job::ImportJobStatus;

/// Whether the tracker still needs progress delivery for this job.
///
/// Delivery stops at terminal states, and also once the review gate has
/// opened on a `validated` job: the job is paused awaiting the user's
/// commit decision, so there is no progress to deliver until they act.
pub fn is_active(status: ImportJobStatus, review_gate_opened: bool) -> bool {
    if status.is_terminal() {
        return false;
    }
    !(status == ImportJobStatus::Validated && review_gate_opened)
}

/// Whether the polling fallback should fire on its next tick.
pub fn should_poll(push_connected: bool, active: bool) -> bool {
    active && !push_connected
}
