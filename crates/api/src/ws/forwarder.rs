//! Bus-to-socket progress forwarder.
//!
//! Subscribes to the [`ProgressBus`] and fans each update out to the
//! WebSocket connections subscribed to that job. Delivery is
//! best-effort: a disconnected client falls back to polling the job
//! status endpoint.

use std::sync::Arc;

use axum::extract::ws::Message;
use dpp_events::ProgressBus;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Spawn the forwarder task.
///
/// Runs until `cancel` fires. Lagged bus receivers skip ahead; the poll
/// fallback covers any updates dropped in between.
pub fn start_progress_forwarder(
    ws_manager: Arc<WsManager>,
    bus: Arc<ProgressBus>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = bus.subscribe();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Progress forwarder stopping");
                    break;
                }
                result = rx.recv() => match result {
                    Ok(update) => {
                        let payload = match serde_json::to_string(&update) {
                            Ok(p) => p,
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to serialize progress update");
                                continue;
                            }
                        };
                        let sent = ws_manager
                            .send_to_job(update.job_id, Message::Text(payload.into()))
                            .await;
                        tracing::trace!(
                            job_id = %update.job_id,
                            status = %update.status,
                            sent,
                            "Progress update forwarded",
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Progress forwarder lagged behind the bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Progress bus closed; forwarder stopping");
                        break;
                    }
                },
            }
        }
    })
}
