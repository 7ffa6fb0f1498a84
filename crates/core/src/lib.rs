//! Pure domain logic for the bulk import job pipeline.
//!
//! This crate has no database, async, or I/O dependencies. It provides:
//!
//! - The import job status state machine and progress arithmetic ([`job`]).
//! - Staging action types and review counts ([`staging`]).
//! - The pre-upload fast validation gate ([`fast_validation`]).
//! - Failed-row CSV export generation ([`export`]).
//! - The shared domain error type ([`error`]).

pub mod error;
pub mod export;
pub mod fast_validation;
pub mod job;
pub mod staging;
pub mod types;
