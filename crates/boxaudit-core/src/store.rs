//! The `AuditStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `boxaudit-store-sqlite`). Higher layers (`boxaudit-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  answer::{Answer, NewAnswer},
  audit::{Audit, AuditStatus},
  kpi::KpiRecord,
  recommend::Recommendation,
  score::{GlobalScore, PillarScore},
};

/// Abstraction over an audit store backend.
///
/// Answers are last-write-wins keyed on `(audit_id, block_code,
/// question_code)`. KPI and score rows are upserted per code; the
/// recommendation set is replaced wholesale on each pipeline run.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AuditStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Audits ────────────────────────────────────────────────────────────

  /// Create and persist a new audit in `Draft` status. The `created_at`
  /// timestamp is set by the store.
  fn create_audit(
    &self,
    gym_name: String,
  ) -> impl Future<Output = Result<Audit, Self::Error>> + Send + '_;

  /// Retrieve an audit by UUID. Returns `None` if not found.
  fn get_audit(
    &self,
    audit_id: Uuid,
  ) -> impl Future<Output = Result<Option<Audit>, Self::Error>> + Send + '_;

  /// List all audits, newest first.
  fn list_audits(
    &self,
  ) -> impl Future<Output = Result<Vec<Audit>, Self::Error>> + Send + '_;

  /// Update the lifecycle status of an existing audit.
  fn set_audit_status(
    &self,
    audit_id: Uuid,
    status: AuditStatus,
  ) -> impl Future<Output = Result<Audit, Self::Error>> + Send + '_;

  /// Delete an audit and everything derived from it (answers, KPIs,
  /// scores, recommendations). Returns `true` if the audit existed.
  fn delete_audit(
    &self,
    audit_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Answers ───────────────────────────────────────────────────────────

  /// Upsert a batch of answers for one audit, last write wins per
  /// question. Returns the number of rows written.
  fn upsert_answers(
    &self,
    audit_id: Uuid,
    answers: Vec<NewAnswer>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Return the full answer snapshot of one audit.
  fn list_answers(
    &self,
    audit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Answer>, Self::Error>> + Send + '_;

  // ── Derived results ───────────────────────────────────────────────────

  /// Upsert KPI rows keyed on `(audit_id, kpi_code)`.
  fn upsert_kpis(
    &self,
    records: Vec<KpiRecord>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_kpis(
    &self,
    audit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<KpiRecord>, Self::Error>> + Send + '_;

  /// Upsert pillar scores keyed on `(audit_id, pillar_code)`.
  fn upsert_scores(
    &self,
    audit_id: Uuid,
    scores: Vec<PillarScore>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_scores(
    &self,
    audit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PillarScore>, Self::Error>> + Send + '_;

  /// Weighted global score over the persisted pillar scores. Returns
  /// `None` if no scores have been computed yet.
  fn global_score(
    &self,
    audit_id: Uuid,
  ) -> impl Future<Output = Result<Option<GlobalScore>, Self::Error>> + Send + '_;

  /// Replace the audit's recommendation set wholesale, atomically.
  fn replace_recommendations(
    &self,
    audit_id: Uuid,
    recommendations: Vec<Recommendation>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Return the recommendation snapshot, sorted by priority then
  /// expected impact.
  fn list_recommendations(
    &self,
    audit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Recommendation>, Self::Error>> + Send + '_;
}
