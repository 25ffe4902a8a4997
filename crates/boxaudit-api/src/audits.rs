//! Handlers for `/audits` lifecycle endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/audits` | All audits, newest first |
//! | `POST`   | `/audits` | Body: [`NewAuditBody`]; returns 201 + stored audit |
//! | `GET`    | `/audits/:id` | Single audit |
//! | `DELETE` | `/audits/:id` | Cascades to answers and derived rows |
//! | `PUT`    | `/audits/:id/status` | Body: `{"status":"in_progress"}` |
//! | `GET`    | `/audits/:id/complete` | Audit + answers + all derived rows |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use boxaudit_core::{audit::AuditStatus, store::AuditStore};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{envelope, envelope_list, error::ApiError};

/// `GET /audits`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  let audits = store
    .list_audits()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(envelope_list(audits)))
}

/// JSON body accepted by `POST /audits`.
#[derive(Debug, Deserialize)]
pub struct NewAuditBody {
  pub gym_name: String,
}

/// `POST /audits` — returns 201 + the stored audit.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAuditBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AuditStore,
{
  if body.gym_name.trim().is_empty() {
    return Err(ApiError::BadRequest("gym_name must not be empty".into()));
  }

  let audit = store
    .create_audit(body.gym_name)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(envelope(audit))))
}

/// `GET /audits/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  let audit = store
    .get_audit(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("audit {id} not found")))?;
  Ok(Json(envelope(audit)))
}

/// `DELETE /audits/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  let deleted = store
    .delete_audit(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !deleted {
    return Err(ApiError::NotFound(format!("audit {id} not found")));
  }
  Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: AuditStatus,
}

/// `PUT /audits/:id/status` — body: `{"status":"draft"|"in_progress"|"completed"}`.
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  if store
    .get_audit(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .is_none()
  {
    return Err(ApiError::NotFound(format!("audit {id} not found")));
  }

  let audit = store
    .set_audit_status(id, body.status)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(envelope(audit)))
}

/// `GET /audits/:id/complete` — the full dashboard payload in one call.
pub async fn complete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  let audit = store
    .get_audit(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("audit {id} not found")))?;

  let answers = store
    .list_answers(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let kpis = store
    .list_kpis(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let scores = store
    .list_scores(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let global_score = store
    .global_score(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let recommendations = store
    .list_recommendations(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(envelope(json!({
    "audit": audit,
    "answers": answers,
    "kpis": kpis,
    "scores": scores,
    "global_score": global_score,
    "recommendations": recommendations,
  }))))
}
