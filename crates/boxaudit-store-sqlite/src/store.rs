//! [`SqliteStore`] — the SQLite implementation of [`AuditStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use boxaudit_core::{
  answer::{Answer, NewAnswer},
  audit::{Audit, AuditStatus},
  kpi::KpiRecord,
  recommend::Recommendation,
  score::{GlobalScore, PillarScore},
  store::AuditStore,
};

use crate::{
  encode::{
    RawAnswer, RawAudit, RawKpi, RawRecommendation, RawScore, encode_dt,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An audit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn audit_exists(&self, audit_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(audit_id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM audits WHERE audit_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// ─── AuditStore impl ─────────────────────────────────────────────────────────

impl AuditStore for SqliteStore {
  type Error = Error;

  // ── Audits ────────────────────────────────────────────────────────────────

  async fn create_audit(&self, gym_name: String) -> Result<Audit> {
    let audit = Audit {
      audit_id: Uuid::new_v4(),
      gym_name,
      status: AuditStatus::Draft,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(audit.audit_id);
    let name       = audit.gym_name.clone();
    let status_str = encode_status(audit.status).to_owned();
    let at_str     = encode_dt(audit.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audits (audit_id, gym_name, status, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(audit)
  }

  async fn get_audit(&self, audit_id: Uuid) -> Result<Option<Audit>> {
    let id_str = encode_uuid(audit_id);

    let raw: Option<RawAudit> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT audit_id, gym_name, status, created_at
               FROM audits WHERE audit_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawAudit {
                  audit_id:   row.get(0)?,
                  gym_name:   row.get(1)?,
                  status:     row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAudit::into_audit).transpose()
  }

  async fn list_audits(&self) -> Result<Vec<Audit>> {
    let raws: Vec<RawAudit> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT audit_id, gym_name, status, created_at
           FROM audits ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawAudit {
              audit_id:   row.get(0)?,
              gym_name:   row.get(1)?,
              status:     row.get(2)?,
              created_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAudit::into_audit).collect()
  }

  async fn set_audit_status(
    &self,
    audit_id: Uuid,
    status: AuditStatus,
  ) -> Result<Audit> {
    let id_str     = encode_uuid(audit_id);
    let status_str = encode_status(status).to_owned();

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE audits SET status = ?2 WHERE audit_id = ?1",
          rusqlite::params![id_str, status_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::AuditNotFound(audit_id));
    }

    self
      .get_audit(audit_id)
      .await?
      .ok_or(Error::AuditNotFound(audit_id))
  }

  async fn delete_audit(&self, audit_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(audit_id);

    // ON DELETE CASCADE removes answers, kpis, scores, recommendations.
    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM audits WHERE audit_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Answers ───────────────────────────────────────────────────────────────

  async fn upsert_answers(
    &self,
    audit_id: Uuid,
    answers: Vec<NewAnswer>,
  ) -> Result<usize> {
    if !self.audit_exists(audit_id).await? {
      return Err(Error::AuditNotFound(audit_id));
    }

    let mut rows = Vec::with_capacity(answers.len());
    for answer in answers {
      let value_kind = answer.value.discriminant().to_owned();
      let value_json =
        answer.value.to_json().map_err(Error::Core)?.to_string();
      rows.push((answer.block_code, answer.question_code, value_kind, value_json));
    }

    let id_str = encode_uuid(audit_id);
    let written = rows.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (block_code, question_code, value_kind, value_json) in rows {
          tx.execute(
            "INSERT INTO answers
               (audit_id, block_code, question_code, value_kind, value_json)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (audit_id, block_code, question_code)
             DO UPDATE SET value_kind = ?4, value_json = ?5",
            rusqlite::params![
              id_str,
              block_code,
              question_code,
              value_kind,
              value_json,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(written)
  }

  async fn list_answers(&self, audit_id: Uuid) -> Result<Vec<Answer>> {
    let id_str = encode_uuid(audit_id);

    let raws: Vec<RawAnswer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT audit_id, block_code, question_code, value_kind, value_json
           FROM answers WHERE audit_id = ?1
           ORDER BY block_code, question_code",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAnswer {
              audit_id:      row.get(0)?,
              block_code:    row.get(1)?,
              question_code: row.get(2)?,
              value_kind:    row.get(3)?,
              value_json:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnswer::into_answer).collect()
  }

  // ── Derived results ───────────────────────────────────────────────────────

  async fn upsert_kpis(&self, records: Vec<KpiRecord>) -> Result<()> {
    let rows: Vec<(String, String, f64, String, String)> = records
      .into_iter()
      .map(|r| {
        (
          encode_uuid(r.audit_id),
          r.kpi_code,
          r.value,
          r.unit,
          encode_dt(r.computed_at),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (audit_id, kpi_code, value, unit, computed_at) in rows {
          tx.execute(
            "INSERT INTO kpis (audit_id, kpi_code, value, unit, computed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (audit_id, kpi_code)
             DO UPDATE SET value = ?3, unit = ?4, computed_at = ?5",
            rusqlite::params![audit_id, kpi_code, value, unit, computed_at],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_kpis(&self, audit_id: Uuid) -> Result<Vec<KpiRecord>> {
    let id_str = encode_uuid(audit_id);

    let raws: Vec<RawKpi> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT audit_id, kpi_code, value, unit, computed_at
           FROM kpis WHERE audit_id = ?1 ORDER BY kpi_code",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawKpi {
              audit_id:    row.get(0)?,
              kpi_code:    row.get(1)?,
              value:       row.get(2)?,
              unit:        row.get(3)?,
              computed_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawKpi::into_record).collect()
  }

  async fn upsert_scores(
    &self,
    audit_id: Uuid,
    scores: Vec<PillarScore>,
  ) -> Result<()> {
    let id_str = encode_uuid(audit_id);
    let rows: Vec<(String, String, i64, f64, String)> = scores
      .into_iter()
      .map(|s| {
        (
          s.pillar_code,
          s.pillar_name,
          i64::from(s.score),
          s.weight,
          s.details.to_string(),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (pillar_code, pillar_name, score, weight, details_json) in rows {
          tx.execute(
            "INSERT INTO scores
               (audit_id, pillar_code, pillar_name, score, weight, details_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (audit_id, pillar_code)
             DO UPDATE SET
               pillar_name = ?3, score = ?4, weight = ?5, details_json = ?6",
            rusqlite::params![
              id_str,
              pillar_code,
              pillar_name,
              score,
              weight,
              details_json,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_scores(&self, audit_id: Uuid) -> Result<Vec<PillarScore>> {
    let id_str = encode_uuid(audit_id);

    let raws: Vec<RawScore> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT pillar_code, pillar_name, score, weight, details_json
           FROM scores WHERE audit_id = ?1 ORDER BY pillar_code",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawScore {
              pillar_code:  row.get(0)?,
              pillar_name:  row.get(1)?,
              score:        row.get(2)?,
              weight:       row.get(3)?,
              details_json: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawScore::into_score).collect()
  }

  async fn global_score(&self, audit_id: Uuid) -> Result<Option<GlobalScore>> {
    let scores = self.list_scores(audit_id).await?;
    if scores.is_empty() {
      return Ok(None);
    }

    let weighted: f64 =
      scores.iter().map(|s| f64::from(s.score) * s.weight).sum();

    Ok(Some(GlobalScore {
      score:        weighted.clamp(0.0, 100.0).round() as u8,
      pillar_count: scores.len(),
    }))
  }

  async fn replace_recommendations(
    &self,
    audit_id: Uuid,
    recommendations: Vec<Recommendation>,
  ) -> Result<()> {
    let id_str = encode_uuid(audit_id);
    let rows: Vec<(String, String, String, String, f64, String, String, String, String)> =
      recommendations
        .into_iter()
        .map(|r| {
          (
            r.rec_code,
            r.title,
            r.description,
            r.priority.as_str().to_owned(),
            r.expected_impact_eur,
            r.effort_level.as_str().to_owned(),
            r.confidence.as_str().to_owned(),
            r.category,
            encode_dt(r.computed_at),
          )
        })
        .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM recommendations WHERE audit_id = ?1",
          rusqlite::params![id_str],
        )?;
        for (
          rec_code,
          title,
          description,
          priority,
          expected_impact_eur,
          effort_level,
          confidence,
          category,
          computed_at,
        ) in rows
        {
          tx.execute(
            "INSERT INTO recommendations
               (audit_id, rec_code, title, description, priority,
                expected_impact_eur, effort_level, confidence, category,
                computed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
              id_str,
              rec_code,
              title,
              description,
              priority,
              expected_impact_eur,
              effort_level,
              confidence,
              category,
              computed_at,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_recommendations(
    &self,
    audit_id: Uuid,
  ) -> Result<Vec<Recommendation>> {
    let id_str = encode_uuid(audit_id);

    let raws: Vec<RawRecommendation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT rec_code, title, description, priority,
                  expected_impact_eur, effort_level, confidence, category,
                  computed_at
           FROM recommendations WHERE audit_id = ?1
           ORDER BY priority ASC, expected_impact_eur DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawRecommendation {
              rec_code:            row.get(0)?,
              title:               row.get(1)?,
              description:         row.get(2)?,
              priority:            row.get(3)?,
              expected_impact_eur: row.get(4)?,
              effort_level:        row.get(5)?,
              confidence:          row.get(6)?,
              category:            row.get(7)?,
              computed_at:         row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRecommendation::into_recommendation)
      .collect()
  }
}
