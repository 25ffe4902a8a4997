//! The recompute pipeline — loads one audit's answer snapshot, derives
//! KPIs, scores and recommendations, and persists all three.
//!
//! The derivation itself is pure; this module only sequences it against a
//! store. Running the pipeline twice over the same snapshot converges to
//! the same persisted state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  kpi::{Kpis, calculate_kpis},
  recommend::{Recommendation, generate_recommendations},
  score::{ScoreReport, calculate_scores},
  store::AuditStore,
};

/// Everything one pipeline run computed, as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
  pub audit_id:        Uuid,
  pub kpis:            Kpis,
  pub scores:          ScoreReport,
  pub recommendations: Vec<Recommendation>,
  pub computed_at:     DateTime<Utc>,
}

/// Recompute and persist the derived results of one audit.
///
/// Returns `None` if the audit does not exist. All persisted rows of the
/// run share one `computed_at` timestamp.
pub async fn run_pipeline<S: AuditStore>(
  store: &S,
  audit_id: Uuid,
) -> Result<Option<PipelineResult>, S::Error> {
  if store.get_audit(audit_id).await?.is_none() {
    return Ok(None);
  }

  let answers = store.list_answers(audit_id).await?;
  let computed_at = Utc::now();

  let kpis = calculate_kpis(&answers);
  let scores = calculate_scores(&kpis);
  let recommendations =
    generate_recommendations(&kpis, &answers, computed_at);

  store.upsert_kpis(kpis.to_records(audit_id, computed_at)).await?;
  store.upsert_scores(audit_id, scores.scores.clone()).await?;
  store
    .replace_recommendations(audit_id, recommendations.clone())
    .await?;

  Ok(Some(PipelineResult {
    audit_id,
    kpis,
    scores,
    recommendations,
    computed_at,
  }))
}
