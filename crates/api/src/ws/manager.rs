use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use dpp_core::types::{JobId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Jobs this connection has subscribed to.
    pub job_subscriptions: HashSet<JobId>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc`
/// and shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller
    /// can forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            job_subscriptions: HashSet::new(),
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Subscribe a connection to progress updates for one job.
    pub async fn subscribe_job(&self, conn_id: &str, job_id: JobId) -> bool {
        let mut conns = self.connections.write().await;
        match conns.get_mut(conn_id) {
            Some(conn) => {
                conn.job_subscriptions.insert(job_id);
                true
            }
            None => false,
        }
    }

    /// Drop a connection's subscription to one job.
    ///
    /// Clients unsubscribe when a job goes inactive so a stable review
    /// snapshot is not re-delivered.
    pub async fn unsubscribe_job(&self, conn_id: &str, job_id: JobId) {
        if let Some(conn) = self.connections.write().await.get_mut(conn_id) {
            conn.job_subscriptions.remove(&job_id);
        }
    }

    /// Send a message to every connection subscribed to the given job.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they will be cleaned up on their next receive loop iteration).
    /// Returns the number of connections the message was sent to.
    pub async fn send_to_job(&self, job_id: JobId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if conn.job_subscriptions.contains(&job_id) {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_to_job_reaches_only_subscribers() {
        let manager = WsManager::new();
        let job_a = uuid::Uuid::new_v4();
        let job_b = uuid::Uuid::new_v4();

        let mut rx1 = manager.add("conn-1".to_string()).await;
        let mut rx2 = manager.add("conn-2".to_string()).await;
        assert!(manager.subscribe_job("conn-1", job_a).await);
        assert!(manager.subscribe_job("conn-2", job_b).await);

        let sent = manager
            .send_to_job(job_a, Message::Text("hello".into()))
            .await;
        assert_eq!(sent, 1);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn subscribe_unknown_connection_is_rejected() {
        let manager = WsManager::new();
        assert!(!manager.subscribe_job("ghost", uuid::Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let manager = WsManager::new();
        let job = uuid::Uuid::new_v4();

        let mut rx = manager.add("conn-1".to_string()).await;
        manager.subscribe_job("conn-1", job).await;
        manager.unsubscribe_job("conn-1", job).await;

        let sent = manager.send_to_job(job, Message::Text("late".into())).await;
        assert_eq!(sent, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn shutdown_sends_close_and_clears() {
        let manager = WsManager::new();
        let mut rx = manager.add("conn-1".to_string()).await;

        manager.shutdown_all().await;
        assert_eq!(manager.connection_count().await, 0);
        assert!(matches!(rx.try_recv(), Ok(Message::Close(None))));
    }
}
