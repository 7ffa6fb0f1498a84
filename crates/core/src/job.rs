//! Import job status state machine and progress arithmetic.
//!
//! This module has zero external dependencies (no DB, no async, no I/O).
//! It provides:
//!
//! - [`ImportJobStatus`] with string conversions and the legal-transition
//!   table. `Validated` is a pause state: the machine never auto-advances
//!   to `Committing` — that transition requires the user's explicit
//!   commit approval.
//! - [`ImportProgress`] counters with the percentage formula.
//! - [`ProgressUpdate`], the transient event pushed to clients.
//! - Timing constants shared by the server and the client tracker.

use serde::{Deserialize, Serialize};

use crate::types::JobId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A job still `pending` after this many seconds is flagged client-side
/// as a diagnostic warning (the background worker may not be running).
/// It is never auto-cancelled.
pub const PENDING_STUCK_SECS: u64 = 30;

/// Poll interval for the fallback transport. Deliberately longer than
/// the push transport's typical cadence so polling stays secondary.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Delay before the tracking widget auto-dismisses after `completed`,
/// giving the user time to read the final counts.
pub const DISMISS_DELAY_SECS: u64 = 5;

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

/// Status of a bulk import job.
///
/// Topological order: `Pending → Validating → Validated → Committing →
/// Completed`, with `Failed` and `Cancelled` reachable as side exits
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportJobStatus {
    Pending,
    Validating,
    Validated,
    Committing,
    Completed,
    Failed,
    Cancelled,
}

impl ImportJobStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::Validated => "validated",
            Self::Committing => "committing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "validating" => Some(Self::Validating),
            "validated" => Some(Self::Validated),
            "committing" => Some(Self::Committing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &[
        "pending",
        "validating",
        "validated",
        "committing",
        "completed",
        "failed",
        "cancelled",
    ];

    /// `true` once the job can make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Position in the forward path of the state machine.
    ///
    /// Terminal side exits rank above everything so a late `validating`
    /// poll result can never overwrite an observed `failed`. Used by the
    /// client tracker's monotonic-display guard.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Validating => 1,
            Self::Validated => 2,
            Self::Committing => 3,
            Self::Completed => 4,
            Self::Failed => 4,
            Self::Cancelled => 4,
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// `Validated → Committing` is listed here but is only ever taken via
    /// the explicit commit approval; the validator never drives it.
    pub fn can_transition_to(&self, next: ImportJobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (Self::Pending, Self::Validating)
            | (Self::Validating, Self::Validated)
            | (Self::Validated, Self::Committing)
            | (Self::Committing, Self::Completed) => true,
            // Side exits from any non-terminal state.
            (_, Self::Failed) | (_, Self::Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ImportJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Per-job row accounting.
///
/// `processed` is monotonically non-decreasing within a job; the
/// validator/committer is the only writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub processed: u32,
    pub total: u32,
    pub created: u32,
    pub updated: u32,
    pub failed: u32,
    pub percentage: u8,
}

impl ImportProgress {
    /// Build a progress snapshot, recomputing the percentage.
    pub fn new(processed: u32, total: u32, created: u32, updated: u32, failed: u32) -> Self {
        Self {
            processed,
            total,
            created,
            updated,
            failed,
            percentage: percentage(processed, total),
        }
    }
}

/// `round(processed / total * 100)`, clamped to `[0, 100]`.
///
/// While `total == 0` (file not yet parsed) the percentage is 0.
pub fn percentage(processed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (f64::from(processed) / f64::from(total) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Progress update event
// ---------------------------------------------------------------------------

/// A transient progress event delivered to subscribed clients.
///
/// Updates are idempotent: applying the same or an older update must not
/// regress displayed progress. The tracker enforces this with
/// [`ImportJobStatus::rank`] plus the `processed` counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub job_id: JobId,
    pub status: ImportJobStatus,
    #[serde(flatten)]
    pub progress: ImportProgress,
    pub filename: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
