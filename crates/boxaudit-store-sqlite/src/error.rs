//! Error type for `boxaudit-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] boxaudit_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored label column held a value no variant maps to.
  #[error("column decode error: {0}")]
  Decode(String),

  #[error("audit not found: {0}")]
  AuditNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
