pub mod import_job;
pub mod staging;

pub use import_job::{ImportJob, ImportJobSummary};
pub use staging::{ImportRowError, StagingProduct};
