//! Audit — the envelope that owns one questionnaire run.
//!
//! An audit holds only identity and lifecycle metadata. All captured data
//! lives in its answers; all derived data (KPIs, scores, recommendations)
//! is owned by the last pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
  Draft,
  InProgress,
  Completed,
}

impl AuditStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::InProgress => "in_progress",
      Self::Completed => "completed",
    }
  }
}

/// One audit of one gym.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audit {
  pub audit_id:   Uuid,
  /// Display name of the audited box.
  pub gym_name:   String,
  pub status:     AuditStatus,
  pub created_at: DateTime<Utc>,
}
