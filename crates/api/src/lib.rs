//! HTTP and WebSocket surface for the bulk import pipeline.
//!
//! Exposes the review/commit gate, the job status endpoint the poll
//! fallback uses, and the push subscription WebSocket. Upload handling,
//! row validation, and the commit executor are external collaborators;
//! this crate reads what they persist and gates the one transition a
//! user must explicitly approve.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
