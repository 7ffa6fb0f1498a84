//! In-process progress bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ProgressBus`] is the seam between the background worker boundary
//! and the push transport. It is designed to be shared via
//! `Arc<ProgressBus>` across the application.

use dpp_core::job::ProgressUpdate;
use dpp_core::types::JobId;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out hub for job progress updates.
///
/// Every subscriber receives every published update; filtering by job
/// happens at the delivery edge (the WebSocket manager keeps a
/// per-connection subscription set).
pub struct ProgressBus {
    sender: broadcast::Sender<ProgressUpdate>,
}

impl ProgressBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are
    /// dropped and slow receivers observe a `RecvError::Lagged`. Lag is
    /// harmless here: updates are idempotent snapshots and the poll
    /// fallback covers any gap.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a progress update to all current subscribers.
    ///
    /// With zero subscribers the update is silently dropped; the job
    /// status store remains the durable record.
    pub fn publish(&self, update: ProgressUpdate) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(update);
    }

    /// Subscribe to all progress updates on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdate> {
        self.sender.subscribe()
    }

    /// Receive updates for a single job, discarding the rest.
    ///
    /// Convenience for single-job consumers such as the client tracker's
    /// push transport in tests.
    pub async fn recv_for_job(
        rx: &mut broadcast::Receiver<ProgressUpdate>,
        job_id: JobId,
    ) -> Option<ProgressUpdate> {
        loop {
            match rx.recv().await {
                Ok(update) if update.job_id == job_id => return Some(update),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "progress subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpp_core::job::{ImportJobStatus, ImportProgress};

    fn update(job_id: JobId, processed: u32) -> ProgressUpdate {
        ProgressUpdate {
            job_id,
            status: ImportJobStatus::Validating,
            progress: ImportProgress::new(processed, 10, 0, 0, 0),
            filename: "catalog.csv".to_string(),
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = ProgressBus::default();
        let mut rx = bus.subscribe();
        let job_id = uuid::Uuid::new_v4();

        bus.publish(update(job_id, 3));

        let received = rx.recv().await.expect("should receive the update");
        assert_eq!(received.job_id, job_id);
        assert_eq!(received.progress.processed, 3);
        assert_eq!(received.progress.percentage, 30);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_update() {
        let bus = ProgressBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        let job_id = uuid::Uuid::new_v4();

        bus.publish(update(job_id, 5));

        assert_eq!(rx1.recv().await.unwrap().job_id, job_id);
        assert_eq!(rx2.recv().await.unwrap().job_id, job_id);
    }

    #[tokio::test]
    async fn recv_for_job_filters_other_jobs() {
        let bus = ProgressBus::default();
        let mut rx = bus.subscribe();
        let mine = uuid::Uuid::new_v4();
        let other = uuid::Uuid::new_v4();

        bus.publish(update(other, 1));
        bus.publish(update(mine, 2));

        let received = ProgressBus::recv_for_job(&mut rx, mine).await.unwrap();
        assert_eq!(received.job_id, mine);
        assert_eq!(received.progress.processed, 2);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = ProgressBus::default();
        bus.publish(update(uuid::Uuid::new_v4(), 1));
    }
}
