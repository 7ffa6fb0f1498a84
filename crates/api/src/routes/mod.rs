pub mod health;
pub mod import_jobs;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Progress push subscription WebSocket.
        .route("/ws", get(ws::ws_handler))
        // Import job lifecycle: status, review gate, commit approval.
        .nest("/import-jobs", import_jobs::router())
}
