//! The import tracker: one job, one owner, exactly-once side effects.
//!
//! [`ImportTracker`] holds the canonical client view of the active
//! import job. All progress updates — push or poll, duplicated or
//! reordered — funnel through [`ImportTracker::apply_update`], which
//! enforces the monotonic-display guard, persists every change, and
//! fires each side effect (review prefetch, listing invalidation,
//! auto-dismiss) at most once per tracked job.
//!
//! The tracker is single-owner: the embedding shell drives it from one
//! task via [`ImportTracker::run`] and renders snapshots from
//! [`ImportTracker::state`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use dpp_core::job::{
    ImportJobStatus, ProgressUpdate, DISMISS_DELAY_SECS, PENDING_STUCK_SECS, POLL_INTERVAL_SECS,
};
use dpp_core::types::JobId;

use crate::delivery;
use crate::poller::StatusPoller;
use crate::state::{restore_snapshot, ImportState, StateStore, StateStoreError};

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Side effects the tracker fires on status transitions.
///
/// Each hook is invoked at most once per tracked job, no matter how many
/// duplicate updates deliver the triggering status.
#[async_trait]
pub trait TrackerHooks: Send + Sync {
    /// Warm the review summary as soon as the job reaches `validated`,
    /// so the review dialog opens with data already loaded.
    async fn prefetch_review(&self, job_id: JobId);

    /// Refresh product listings after a commit completes.
    async fn invalidate_listings(&self);
}

/// Handle to the push transport.
///
/// `connected` flips false when the underlying connection drops and the
/// tracker falls back to polling until it flips true again.
pub struct PushSubscription {
    pub updates: mpsc::UnboundedReceiver<ProgressUpdate>,
    pub connected: watch::Receiver<bool>,
}

/// Side effects that have already fired for the tracked job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SideEffectPhase {
    GateOpened,
    Completed,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

pub struct ImportTracker {
    store: Arc<dyn StateStore>,
    poller: Arc<dyn StatusPoller>,
    hooks: Arc<dyn TrackerHooks>,

    state: Option<ImportState>,
    /// The widget's review prompt is showing for a `validated` job.
    review_gate_opened: bool,
    /// The modal review dialog itself is open.
    review_dialog_open: bool,
    fired: HashSet<SideEffectPhase>,

    dismiss_at: Option<Instant>,
    pending_since: Option<Instant>,
    pending_warned: bool,
}

impl ImportTracker {
    pub fn new(
        store: Arc<dyn StateStore>,
        poller: Arc<dyn StatusPoller>,
        hooks: Arc<dyn TrackerHooks>,
    ) -> Self {
        Self {
            store,
            poller,
            hooks,
            state: None,
            review_gate_opened: false,
            review_dialog_open: false,
            fired: HashSet::new(),
            dismiss_at: None,
            pending_since: None,
            pending_warned: false,
        }
    }

    // -- snapshots --------------------------------------------------------

    pub fn state(&self) -> Option<&ImportState> {
        self.state.as_ref()
    }

    pub fn review_gate_opened(&self) -> bool {
        self.review_gate_opened
    }

    pub fn review_dialog_open(&self) -> bool {
        self.review_dialog_open
    }

    fn is_active(&self) -> bool {
        self.state
            .as_ref()
            .map(|s| delivery::is_active(s.status, self.review_gate_opened))
            .unwrap_or(false)
    }

    // -- lifecycle --------------------------------------------------------

    /// Restore a persisted snapshot, if any.
    ///
    /// Terminal snapshots are discarded (and removed from the store). A
    /// restored `validated` job re-opens the review gate so the user
    /// sees the commit prompt again after a reload. Returns whether a
    /// job is now being tracked.
    pub async fn restore(&mut self) -> Result<bool, StateStoreError> {
        match restore_snapshot(self.store.load().await?) {
            Some(state) => {
                if state.status == ImportJobStatus::Pending {
                    self.pending_since = Some(Instant::now());
                }
                let job_id = state.job_id;
                let reached_validated = state.status == ImportJobStatus::Validated;
                self.state = Some(state);
                if reached_validated {
                    self.open_gate(job_id).await;
                }
                Ok(true)
            }
            None => {
                self.store.clear().await?;
                Ok(false)
            }
        }
    }

    /// Begin tracking a freshly accepted upload.
    pub async fn start_import(&mut self, job_id: JobId, filename: impl Into<String>) {
        self.state = Some(ImportState::new(job_id, filename));
        self.review_gate_opened = false;
        self.review_dialog_open = false;
        self.fired.clear();
        self.dismiss_at = None;
        self.pending_since = Some(Instant::now());
        self.pending_warned = false;
        self.persist().await;
    }

    /// Apply a progress update from either transport.
    ///
    /// Updates for other jobs are ignored. Stale updates (lower status
    /// rank, or same rank with a lower `processed` count) never regress
    /// the displayed state.
    pub async fn apply_update(&mut self, update: ProgressUpdate) {
        let Some(current) = &self.state else {
            return;
        };
        if current.job_id != update.job_id {
            tracing::debug!(
                tracked = %current.job_id,
                received = %update.job_id,
                "ignoring update for untracked job"
            );
            return;
        }

        let cur_rank = current.status.rank();
        let new_rank = update.status.rank();
        if new_rank < cur_rank
            || (new_rank == cur_rank && update.progress.processed < current.progress.processed)
        {
            tracing::debug!(
                current = %current.status,
                received = %update.status,
                "discarding stale progress update"
            );
            return;
        }

        let next = ImportState {
            job_id: update.job_id,
            status: update.status,
            progress: update.progress,
            filename: update.filename,
        };
        if update.status != ImportJobStatus::Pending {
            self.pending_since = None;
        }
        if self.state.as_ref() != Some(&next) {
            self.state = Some(next);
            self.persist().await;
        }

        match update.status {
            ImportJobStatus::Validated => self.open_gate(update.job_id).await,
            ImportJobStatus::Completed => {
                if self.fired.insert(SideEffectPhase::Completed) {
                    self.hooks.invalidate_listings().await;
                    self.dismiss_at =
                        Some(Instant::now() + Duration::from_secs(DISMISS_DELAY_SECS));
                }
            }
            _ => {}
        }
    }

    async fn open_gate(&mut self, job_id: JobId) {
        if self.fired.insert(SideEffectPhase::GateOpened) {
            self.review_gate_opened = true;
            self.hooks.prefetch_review(job_id).await;
        }
    }

    /// Record a user-initiated cancellation.
    ///
    /// The server round trip happens elsewhere; locally the job flips to
    /// `cancelled` immediately and the snapshot is removed so a reload
    /// cannot resurrect it. The widget keeps showing the cancelled state
    /// until dismissed.
    pub async fn cancel_import(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };
        state.status = ImportJobStatus::Cancelled;
        self.review_gate_opened = false;
        self.review_dialog_open = false;
        self.pending_since = None;
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "failed to clear import snapshot");
        }
    }

    /// Open the review dialog. Only meaningful while `validated`.
    pub fn open_review_dialog(&mut self) -> bool {
        let validated = self
            .state
            .as_ref()
            .is_some_and(|s| s.status == ImportJobStatus::Validated);
        if validated {
            self.review_dialog_open = true;
        }
        validated
    }

    pub fn close_review_dialog(&mut self) {
        self.review_dialog_open = false;
    }

    /// Remove the widget and forget the job.
    pub async fn dismiss_widget(&mut self) {
        self.state = None;
        self.review_gate_opened = false;
        self.review_dialog_open = false;
        self.dismiss_at = None;
        self.pending_since = None;
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "failed to clear import snapshot");
        }
    }

    async fn persist(&self) {
        let Some(state) = &self.state else { return };
        if let Err(e) = self.store.save(state).await {
            // Persistence is best effort; the live view stays correct.
            tracing::warn!(error = %e, "failed to persist import state");
        }
    }

    fn pending_stuck_deadline(&self) -> Option<Instant> {
        if self.pending_warned {
            return None;
        }
        self.pending_since
            .map(|since| since + Duration::from_secs(PENDING_STUCK_SECS))
    }

    // -- run loop ---------------------------------------------------------

    /// Drive the tracker until `cancel` fires.
    ///
    /// Push updates are applied as they arrive; whenever the push
    /// transport reports disconnected and the job is still active, the
    /// polling fallback fires every [`POLL_INTERVAL_SECS`]. Timers for
    /// auto-dismiss and the stuck-pending warning run off the same loop.
    pub async fn run(&mut self, mut subscription: PushSubscription, cancel: CancellationToken) {
        let mut poll_tick = time::interval(Duration::from_secs(POLL_INTERVAL_SECS));
        poll_tick.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        let mut push_connected = *subscription.connected.borrow();
        let mut push_open = true;
        let mut watch_open = true;

        loop {
            let dismiss = sleep_opt(self.dismiss_at);
            let stuck = sleep_opt(self.pending_stuck_deadline());

            tokio::select! {
                _ = cancel.cancelled() => break,

                maybe = subscription.updates.recv(), if push_open => match maybe {
                    Some(update) => self.apply_update(update).await,
                    None => {
                        push_open = false;
                        push_connected = false;
                    }
                },

                changed = subscription.connected.changed(), if watch_open => match changed {
                    Ok(()) => {
                        push_connected = *subscription.connected.borrow();
                        tracing::debug!(connected = push_connected, "push transport state changed");
                    }
                    Err(_) => {
                        watch_open = false;
                        push_connected = false;
                    }
                },

                _ = poll_tick.tick() => {
                    if delivery::should_poll(push_connected, self.is_active()) {
                        let job_id = match &self.state {
                            Some(state) => state.job_id,
                            None => continue,
                        };
                        match self.poller.poll(job_id).await {
                            Ok(update) => self.apply_update(update).await,
                            // Soft failure: keep the last displayed state.
                            Err(e) => tracing::warn!(%job_id, error = %e, "status poll failed"),
                        }
                    }
                },

                _ = dismiss => self.dismiss_widget().await,

                _ = stuck => {
                    self.pending_warned = true;
                    if let Some(state) = &self.state {
                        tracing::warn!(
                            job_id = %state.job_id,
                            "import job still pending after {PENDING_STUCK_SECS}s; the background worker may not be running"
                        );
                    }
                },
            }
        }
    }
}

async fn sleep_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
