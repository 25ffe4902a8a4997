//! Handlers for derived-result endpoints — the recompute trigger plus the
//! read side of KPIs, scores and recommendations.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/audits/:id/recompute` | Runs the full pipeline, persists, returns everything |
//! | `GET`  | `/audits/:id/kpis` | Persisted KPI rows |
//! | `GET`  | `/audits/:id/scores` | Persisted pillar scores |
//! | `GET`  | `/audits/:id/global-score` | Weighted global; 404 before first run |
//! | `GET`  | `/audits/:id/recommendations` | Snapshot of the last run |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use boxaudit_core::{pipeline::run_pipeline, store::AuditStore};
use uuid::Uuid;

use crate::{answers::ensure_audit, envelope, envelope_list, error::ApiError};

/// `POST /audits/:id/recompute`
pub async fn recompute<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  let result = run_pipeline(&*store, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("audit {id} not found")))?;
  Ok(Json(envelope(result)))
}

/// `GET /audits/:id/kpis`
pub async fn kpis<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  ensure_audit(&*store, id).await?;
  let records = store
    .list_kpis(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(envelope_list(records)))
}

/// `GET /audits/:id/scores`
pub async fn scores<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  ensure_audit(&*store, id).await?;
  let scores = store
    .list_scores(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(envelope_list(scores)))
}

/// `GET /audits/:id/global-score`
pub async fn global_score<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  ensure_audit(&*store, id).await?;
  let global = store
    .global_score(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("audit {id} has no computed scores yet"))
    })?;
  Ok(Json(envelope(global)))
}

/// `GET /audits/:id/recommendations`
pub async fn recommendations<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  ensure_audit(&*store, id).await?;
  let recommendations = store
    .list_recommendations(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(envelope_list(recommendations)))
}
