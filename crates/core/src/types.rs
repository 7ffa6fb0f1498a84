/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Import jobs are addressed by an opaque UUID, immutable once created.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
