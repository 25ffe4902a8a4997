//! Handlers for on-demand insight endpoints. Nothing here is persisted;
//! each request recomputes from the current answer snapshot.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/audits/:id/health` | Financial health /100 with component breakdown |
//! | `GET`  | `/audits/:id/heatmap` | Day x time-slot occupancy estimate |
//! | `GET`  | `/audits/:id/churn-risk` | Risk factors, level and actions |
//! | `GET`  | `/audits/:id/pricing` | Quality/price quadrant vs the market zone |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use boxaudit_core::{
  extract::extract_finance_data,
  health::financial_health,
  insights::{churn_risk as analyze_churn_risk, pricing_position, schedule_heat_map},
  store::AuditStore,
};
use uuid::Uuid;

use crate::{answers::ensure_audit, envelope, error::ApiError};

/// `GET /audits/:id/health`
pub async fn health<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  let answers = load_answers(&*store, id).await?;
  let report = financial_health(&extract_finance_data(&answers));
  Ok(Json(envelope(report)))
}

/// `GET /audits/:id/heatmap`
pub async fn heatmap<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  let answers = load_answers(&*store, id).await?;
  Ok(Json(envelope(schedule_heat_map(&answers))))
}

/// `GET /audits/:id/churn-risk`
pub async fn churn_risk<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  let answers = load_answers(&*store, id).await?;
  Ok(Json(envelope(analyze_churn_risk(&answers))))
}

/// `GET /audits/:id/pricing`
pub async fn pricing<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  let answers = load_answers(&*store, id).await?;
  Ok(Json(envelope(pricing_position(&answers))))
}

async fn load_answers<S>(
  store: &S,
  id: Uuid,
) -> Result<Vec<boxaudit_core::answer::Answer>, ApiError>
where
  S: AuditStore,
{
  ensure_audit(store, id).await?;
  store
    .list_answers(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))
}
