//! Integration tests for `SqliteStore` against an in-memory database.

use boxaudit_core::{
  answer::{AnswerValue, NewAnswer},
  audit::AuditStatus,
  pipeline::run_pipeline,
  store::AuditStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn answer(block: &str, question: &str, value: AnswerValue) -> NewAnswer {
  NewAnswer {
    block_code:    block.to_owned(),
    question_code: question.to_owned(),
    value,
  }
}

fn num(block: &str, question: &str, value: f64) -> NewAnswer {
  answer(block, question, AnswerValue::Number(value))
}

// ─── Audits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_audit() {
  let s = store().await;

  let audit = s.create_audit("CrossFit Centre".into()).await.unwrap();
  assert_eq!(audit.status, AuditStatus::Draft);

  let fetched = s.get_audit(audit.audit_id).await.unwrap();
  assert!(fetched.is_some());
  let fetched = fetched.unwrap();
  assert_eq!(fetched.audit_id, audit.audit_id);
  assert_eq!(fetched.gym_name, "CrossFit Centre");
}

#[tokio::test]
async fn get_audit_missing_returns_none() {
  let s = store().await;
  let result = s.get_audit(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn list_audits_newest_first() {
  let s = store().await;
  s.create_audit("Box A".into()).await.unwrap();
  s.create_audit("Box B".into()).await.unwrap();
  s.create_audit("Box C".into()).await.unwrap();

  let all = s.list_audits().await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn status_transitions_persist() {
  let s = store().await;
  let audit = s.create_audit("Box".into()).await.unwrap();

  let updated = s
    .set_audit_status(audit.audit_id, AuditStatus::InProgress)
    .await
    .unwrap();
  assert_eq!(updated.status, AuditStatus::InProgress);

  let fetched = s.get_audit(audit.audit_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, AuditStatus::InProgress);
}

#[tokio::test]
async fn set_status_on_missing_audit_errors() {
  let s = store().await;
  let err = s
    .set_audit_status(Uuid::new_v4(), AuditStatus::Completed)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::AuditNotFound(_)));
}

// ─── Answers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_and_list_answers() {
  let s = store().await;
  let audit = s.create_audit("Box".into()).await.unwrap();

  let written = s
    .upsert_answers(
      audit.audit_id,
      vec![
        num("revenus_abonnements", "ca_abonnements_12_mois", 9500.0),
        answer(
          "localisation",
          "revenus_moyens_zone",
          AnswerValue::Text("Moyens".into()),
        ),
      ],
    )
    .await
    .unwrap();
  assert_eq!(written, 2);

  let answers = s.list_answers(audit.audit_id).await.unwrap();
  assert_eq!(answers.len(), 2);
  assert!(answers.iter().all(|a| a.audit_id == audit.audit_id));
}

#[tokio::test]
async fn answer_rewrite_is_last_write_wins() {
  let s = store().await;
  let audit = s.create_audit("Box".into()).await.unwrap();

  s.upsert_answers(audit.audit_id, vec![num("b", "q", 100.0)])
    .await
    .unwrap();
  s.upsert_answers(audit.audit_id, vec![num("b", "q", 250.0)])
    .await
    .unwrap();

  let answers = s.list_answers(audit.audit_id).await.unwrap();
  assert_eq!(answers.len(), 1);
  assert_eq!(answers[0].value, AnswerValue::Number(250.0));
}

#[tokio::test]
async fn answer_value_kinds_round_trip() {
  let s = store().await;
  let audit = s.create_audit("Box".into()).await.unwrap();

  let values = vec![
    answer("b", "n", AnswerValue::Number(42.5)),
    answer("b", "t", AnswerValue::Text("9500".into())),
    answer("b", "f", AnswerValue::Bool(true)),
    answer(
      "b",
      "l",
      AnswerValue::List(vec!["wod".into(), "halterophilie".into()]),
    ),
  ];
  s.upsert_answers(audit.audit_id, values.clone()).await.unwrap();

  let stored = s.list_answers(audit.audit_id).await.unwrap();
  assert_eq!(stored.len(), 4);
  for input in values {
    let found = stored
      .iter()
      .find(|a| a.question_code == input.question_code)
      .unwrap();
    assert_eq!(found.value, input.value);
  }
}

#[tokio::test]
async fn upsert_answers_on_missing_audit_errors() {
  let s = store().await;
  let err = s
    .upsert_answers(Uuid::new_v4(), vec![num("b", "q", 1.0)])
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::AuditNotFound(_)));
}

// ─── Pipeline round trip ─────────────────────────────────────────────────────

fn fixture_answers() -> Vec<NewAnswer> {
  vec![
    num("produits_exploitation", "ca_abonnements_mensuels", 114_000.0),
    num("produits_exploitation", "ca_personal_training", 14_400.0),
    num("charges_exploitation", "loyer_mensuel_ht", 2_400.0),
    num("charges_exploitation", "salaires_bruts_coachs", 48_000.0),
    num("structure_base", "nb_membres_actifs_total", 150.0),
    num("infrastructure_detaillee", "surface_totale", 400.0),
    num("retention_churn", "resiliations_mensuelles", 8.0),
    num("acquisition_conversion", "essais_gratuits_mois", 20.0),
    num("acquisition_conversion", "conversions_essai_abonne_mois", 8.0),
  ]
}

#[tokio::test]
async fn pipeline_persists_kpis_scores_and_recommendations() {
  let s = store().await;
  let audit = s.create_audit("Box".into()).await.unwrap();
  s.upsert_answers(audit.audit_id, fixture_answers())
    .await
    .unwrap();

  let result = run_pipeline(&s, audit.audit_id).await.unwrap().unwrap();
  assert_eq!(result.audit_id, audit.audit_id);

  let kpis = s.list_kpis(audit.audit_id).await.unwrap();
  assert_eq!(kpis.len(), 13);
  assert!(kpis.iter().all(|k| k.computed_at == result.computed_at));

  let scores = s.list_scores(audit.audit_id).await.unwrap();
  assert_eq!(scores.len(), 3);

  let global = s.global_score(audit.audit_id).await.unwrap().unwrap();
  assert_eq!(global.pillar_count, 3);
  assert_eq!(global.score, result.scores.global_score);

  let recs = s.list_recommendations(audit.audit_id).await.unwrap();
  assert_eq!(recs.len(), result.recommendations.len());
  assert!(!recs.is_empty());
}

#[tokio::test]
async fn pipeline_on_missing_audit_returns_none() {
  let s = store().await;
  let result = run_pipeline(&s, Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn rerun_converges_instead_of_duplicating() {
  let s = store().await;
  let audit = s.create_audit("Box".into()).await.unwrap();
  s.upsert_answers(audit.audit_id, fixture_answers())
    .await
    .unwrap();

  run_pipeline(&s, audit.audit_id).await.unwrap().unwrap();
  let first_kpis = s.list_kpis(audit.audit_id).await.unwrap();

  run_pipeline(&s, audit.audit_id).await.unwrap().unwrap();
  let second_kpis = s.list_kpis(audit.audit_id).await.unwrap();

  assert_eq!(first_kpis.len(), second_kpis.len());
  for (a, b) in first_kpis.iter().zip(&second_kpis) {
    assert_eq!(a.kpi_code, b.kpi_code);
    assert_eq!(a.value, b.value);
  }

  let recs = s.list_recommendations(audit.audit_id).await.unwrap();
  assert!(recs.len() <= boxaudit_core::recommend::MAX_RECOMMENDATIONS);
}

#[tokio::test]
async fn recompute_reflects_changed_answers() {
  let s = store().await;
  let audit = s.create_audit("Box".into()).await.unwrap();
  s.upsert_answers(audit.audit_id, fixture_answers())
    .await
    .unwrap();

  let first = run_pipeline(&s, audit.audit_id).await.unwrap().unwrap();

  // Double the membership revenue and recompute.
  s.upsert_answers(
    audit.audit_id,
    vec![num("produits_exploitation", "ca_abonnements_mensuels", 228_000.0)],
  )
  .await
  .unwrap();
  let second = run_pipeline(&s, audit.audit_id).await.unwrap().unwrap();

  assert!(second.kpis.ca_total_12m > first.kpis.ca_total_12m);

  let stored = s.list_kpis(audit.audit_id).await.unwrap();
  let ca = stored.iter().find(|k| k.kpi_code == "ca_total_12m").unwrap();
  assert_eq!(ca.value, second.kpis.ca_total_12m);
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_audit_cascades_to_derived_rows() {
  let s = store().await;
  let audit = s.create_audit("Box".into()).await.unwrap();
  s.upsert_answers(audit.audit_id, fixture_answers())
    .await
    .unwrap();
  run_pipeline(&s, audit.audit_id).await.unwrap().unwrap();

  let deleted = s.delete_audit(audit.audit_id).await.unwrap();
  assert!(deleted);

  assert!(s.get_audit(audit.audit_id).await.unwrap().is_none());
  assert!(s.list_answers(audit.audit_id).await.unwrap().is_empty());
  assert!(s.list_kpis(audit.audit_id).await.unwrap().is_empty());
  assert!(s.list_scores(audit.audit_id).await.unwrap().is_empty());
  assert!(
    s.list_recommendations(audit.audit_id)
      .await
      .unwrap()
      .is_empty()
  );
  assert!(s.global_score(audit.audit_id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_missing_audit_returns_false() {
  let s = store().await;
  assert!(!s.delete_audit(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn global_score_none_before_first_run() {
  let s = store().await;
  let audit = s.create_audit("Box".into()).await.unwrap();
  assert!(s.global_score(audit.audit_id).await.unwrap().is_none());
}
