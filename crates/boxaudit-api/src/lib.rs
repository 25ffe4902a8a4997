//! JSON REST API for the box-audit service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`boxaudit_core::store::AuditStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! Every success response is wrapped in `{"success": true, "data": ...}`
//! (list endpoints add a `"count"` field); errors come back as
//! `{"success": false, "error": "..."}`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", boxaudit_api::api_router(store.clone()))
//! ```

pub mod answers;
pub mod audits;
pub mod error;
pub mod insights;
pub mod results;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use boxaudit_core::store::AuditStore;
use serde::Serialize;
use serde_json::json;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AuditStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Audits
    .route("/audits", get(audits::list::<S>).post(audits::create::<S>))
    .route(
      "/audits/{id}",
      get(audits::get_one::<S>).delete(audits::delete_one::<S>),
    )
    .route("/audits/{id}/status", put(audits::set_status::<S>))
    .route("/audits/{id}/complete", get(audits::complete::<S>))
    // Answers
    .route(
      "/audits/{id}/answers",
      get(answers::list::<S>).post(answers::upsert::<S>),
    )
    // Derived results
    .route("/audits/{id}/recompute", post(results::recompute::<S>))
    .route("/audits/{id}/kpis", get(results::kpis::<S>))
    .route("/audits/{id}/scores", get(results::scores::<S>))
    .route("/audits/{id}/global-score", get(results::global_score::<S>))
    .route(
      "/audits/{id}/recommendations",
      get(results::recommendations::<S>),
    )
    // On-demand insights
    .route("/audits/{id}/health", get(insights::health::<S>))
    .route("/audits/{id}/heatmap", get(insights::heatmap::<S>))
    .route("/audits/{id}/churn-risk", get(insights::churn_risk::<S>))
    .route("/audits/{id}/pricing", get(insights::pricing::<S>))
    .with_state(store)
}

/// `{"success": true, "data": <data>}`
pub(crate) fn envelope<T: Serialize>(data: T) -> serde_json::Value {
  json!({ "success": true, "data": data })
}

/// `{"success": true, "count": <len>, "data": <data>}`
pub(crate) fn envelope_list<T: Serialize>(data: Vec<T>) -> serde_json::Value {
  json!({ "success": true, "count": data.len(), "data": data })
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use boxaudit_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  async fn router() -> Router<()> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    app: Router<()>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  async fn create_audit(app: &Router<()>, name: &str) -> String {
    let (status, body) = send(
      app.clone(),
      "POST",
      "/audits",
      Some(json!({ "gym_name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["audit_id"].as_str().unwrap().to_owned()
  }

  fn answers_body() -> Value {
    json!({ "answers": [
      { "block_code": "produits_exploitation",
        "question_code": "ca_abonnements_mensuels",
        "value": { "type": "number", "data": 114000.0 } },
      { "block_code": "charges_exploitation",
        "question_code": "loyer_mensuel_ht",
        "value": { "type": "text", "data": "2400" } },
      { "block_code": "structure_base",
        "question_code": "nb_membres_actifs_total",
        "value": { "type": "number", "data": 150.0 } },
    ]})
  }

  // ── Audits ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_list_audits() {
    let app = router().await;
    create_audit(&app, "CrossFit Centre").await;

    let (status, body) = send(app, "GET", "/audits", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["gym_name"], "CrossFit Centre");
    assert_eq!(body["data"][0]["status"], "draft");
  }

  #[tokio::test]
  async fn create_rejects_blank_name() {
    let app = router().await;
    let (status, body) =
      send(app, "POST", "/audits", Some(json!({ "gym_name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
  }

  #[tokio::test]
  async fn unknown_audit_returns_404_envelope() {
    let app = router().await;
    let (status, body) =
      send(app, "GET", &format!("/audits/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("not found"));
  }

  #[tokio::test]
  async fn status_update_round_trip() {
    let app = router().await;
    let id = create_audit(&app, "Box").await;

    let (status, body) = send(
      app.clone(),
      "PUT",
      &format!("/audits/{id}/status"),
      Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");
  }

  // ── Answers ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn answers_upsert_and_list() {
    let app = router().await;
    let id = create_audit(&app, "Box").await;

    let (status, body) = send(
      app.clone(),
      "POST",
      &format!("/audits/{id}/answers"),
      Some(answers_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let (status, body) =
      send(app, "GET", &format!("/audits/{id}/answers"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
  }

  #[tokio::test]
  async fn empty_answer_batch_is_rejected() {
    let app = router().await;
    let id = create_audit(&app, "Box").await;

    let (status, _) = send(
      app,
      "POST",
      &format!("/audits/{id}/answers"),
      Some(json!({ "answers": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Recompute and derived reads ─────────────────────────────────────────────

  #[tokio::test]
  async fn recompute_persists_derived_results() {
    let app = router().await;
    let id = create_audit(&app, "Box").await;
    send(
      app.clone(),
      "POST",
      &format!("/audits/{id}/answers"),
      Some(answers_body()),
    )
    .await;

    let (status, body) =
      send(app.clone(), "POST", &format!("/audits/{id}/recompute"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["scores"]["scores"].as_array().unwrap().len(), 3);

    let (status, body) =
      send(app.clone(), "GET", &format!("/audits/{id}/kpis"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 13);

    let (status, body) =
      send(app, "GET", &format!("/audits/{id}/global-score"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pillar_count"], 3);
  }

  #[tokio::test]
  async fn global_score_is_404_before_first_recompute() {
    let app = router().await;
    let id = create_audit(&app, "Box").await;

    let (status, _) =
      send(app, "GET", &format!("/audits/{id}/global-score"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn recommendations_never_empty_after_recompute() {
    let app = router().await;
    let id = create_audit(&app, "Box").await;
    send(app.clone(), "POST", &format!("/audits/{id}/recompute"), None)
      .await;

    let (status, body) =
      send(app, "GET", &format!("/audits/{id}/recommendations"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["count"].as_u64().unwrap() >= 1);
  }

  // ── Insights ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn insight_endpoints_answer_from_the_snapshot() {
    let app = router().await;
    let id = create_audit(&app, "Box").await;
    send(
      app.clone(),
      "POST",
      &format!("/audits/{id}/answers"),
      Some(answers_body()),
    )
    .await;

    let (status, body) =
      send(app.clone(), "GET", &format!("/audits/{id}/health"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["score"].is_number());

    let (status, body) =
      send(app.clone(), "GET", &format!("/audits/{id}/heatmap"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cells"].as_array().unwrap().len(), 42);

    let (status, body) =
      send(app.clone(), "GET", &format!("/audits/{id}/churn-risk"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["risk_level"].is_string());

    let (status, body) =
      send(app, "GET", &format!("/audits/{id}/pricing"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["position"].is_string());
  }

  // ── Deletion ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_then_read_returns_404() {
    let app = router().await;
    let id = create_audit(&app, "Box").await;

    let (status, body) =
      send(app.clone(), "DELETE", &format!("/audits/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) =
      send(app, "GET", &format!("/audits/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Complete payload ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn complete_bundles_everything() {
    let app = router().await;
    let id = create_audit(&app, "Box").await;
    send(
      app.clone(),
      "POST",
      &format!("/audits/{id}/answers"),
      Some(answers_body()),
    )
    .await;
    send(app.clone(), "POST", &format!("/audits/{id}/recompute"), None)
      .await;

    let (status, body) =
      send(app, "GET", &format!("/audits/{id}/complete"), None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["audit"]["audit_id"], id);
    assert_eq!(data["answers"].as_array().unwrap().len(), 3);
    assert_eq!(data["kpis"].as_array().unwrap().len(), 13);
    assert_eq!(data["scores"].as_array().unwrap().len(), 3);
    assert!(data["global_score"]["score"].is_number());
    assert!(!data["recommendations"].as_array().unwrap().is_empty());
  }
}
