//! Handlers for `/audits/:id/answers`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/audits/:id/answers` | Full answer snapshot |
//! | `POST` | `/audits/:id/answers` | Body: `{"answers":[...]}`; last write wins |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use boxaudit_core::{answer::NewAnswer, store::AuditStore};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{envelope_list, error::ApiError};

/// `GET /audits/:id/answers`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  ensure_audit(&*store, id).await?;
  let answers = store
    .list_answers(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(envelope_list(answers)))
}

/// JSON body accepted by `POST /audits/:id/answers`.
#[derive(Debug, Deserialize)]
pub struct AnswerBatchBody {
  pub answers: Vec<NewAnswer>,
}

/// `POST /audits/:id/answers` — upserts the batch, one row per question.
pub async fn upsert<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AnswerBatchBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AuditStore,
{
  if body.answers.is_empty() {
    return Err(ApiError::BadRequest("answers must not be empty".into()));
  }
  ensure_audit(&*store, id).await?;

  let written = store
    .upsert_answers(id, body.answers)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "success": true, "count": written })))
}

pub(crate) async fn ensure_audit<S>(store: &S, id: Uuid) -> Result<(), ApiError>
where
  S: AuditStore,
{
  store
    .get_audit(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .map(|_| ())
    .ok_or_else(|| ApiError::NotFound(format!("audit {id} not found")))
}
