//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Structured fields (answer
//! payloads, score details) are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use boxaudit_core::{
  answer::{Answer, AnswerValue},
  audit::{Audit, AuditStatus},
  kpi::KpiRecord,
  recommend::{Confidence, Effort, Priority, Recommendation},
  score::PillarScore,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── AuditStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: AuditStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<AuditStatus> {
  match s {
    "draft" => Ok(AuditStatus::Draft),
    "in_progress" => Ok(AuditStatus::InProgress),
    "completed" => Ok(AuditStatus::Completed),
    other => {
      Err(Error::Core(boxaudit_core::Error::UnknownStatus(other.to_owned())))
    }
  }
}

// ─── Recommendation labels ────────────────────────────────────────────────────

pub fn decode_priority(s: &str) -> Result<Priority> {
  match s {
    "P1" => Ok(Priority::P1),
    "P2" => Ok(Priority::P2),
    "P3" => Ok(Priority::P3),
    other => Err(Error::Decode(format!("unknown priority: {other:?}"))),
  }
}

pub fn decode_effort(s: &str) -> Result<Effort> {
  match s {
    "facile" => Ok(Effort::Facile),
    "moyen" => Ok(Effort::Moyen),
    "difficile" => Ok(Effort::Difficile),
    other => Err(Error::Decode(format!("unknown effort level: {other:?}"))),
  }
}

pub fn decode_confidence(s: &str) -> Result<Confidence> {
  match s {
    "faible" => Ok(Confidence::Faible),
    "moyen" => Ok(Confidence::Moyen),
    "fort" => Ok(Confidence::Fort),
    other => Err(Error::Decode(format!("unknown confidence: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `audits` row.
pub struct RawAudit {
  pub audit_id:   String,
  pub gym_name:   String,
  pub status:     String,
  pub created_at: String,
}

impl RawAudit {
  pub fn into_audit(self) -> Result<Audit> {
    Ok(Audit {
      audit_id:   decode_uuid(&self.audit_id)?,
      gym_name:   self.gym_name,
      status:     decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `answers` row.
pub struct RawAnswer {
  pub audit_id:      String,
  pub block_code:    String,
  pub question_code: String,
  pub value_kind:    String,
  pub value_json:    String,
}

impl RawAnswer {
  pub fn into_answer(self) -> Result<Answer> {
    let data: serde_json::Value = serde_json::from_str(&self.value_json)?;
    let value = AnswerValue::from_parts(&self.value_kind, data)
      .map_err(Error::Core)?;

    Ok(Answer {
      audit_id: decode_uuid(&self.audit_id)?,
      block_code: self.block_code,
      question_code: self.question_code,
      value,
    })
  }
}

/// Raw strings read directly from a `kpis` row.
pub struct RawKpi {
  pub audit_id:    String,
  pub kpi_code:    String,
  pub value:       f64,
  pub unit:        String,
  pub computed_at: String,
}

impl RawKpi {
  pub fn into_record(self) -> Result<KpiRecord> {
    Ok(KpiRecord {
      audit_id:    decode_uuid(&self.audit_id)?,
      kpi_code:    self.kpi_code,
      value:       self.value,
      unit:        self.unit,
      computed_at: decode_dt(&self.computed_at)?,
    })
  }
}

/// Raw strings read directly from a `scores` row.
pub struct RawScore {
  pub pillar_code:  String,
  pub pillar_name:  String,
  pub score:        i64,
  pub weight:       f64,
  pub details_json: String,
}

impl RawScore {
  pub fn into_score(self) -> Result<PillarScore> {
    Ok(PillarScore {
      pillar_code: self.pillar_code,
      pillar_name: self.pillar_name,
      score:       u8::try_from(self.score.clamp(0, 100)).unwrap_or(0),
      weight:      self.weight,
      details:     serde_json::from_str(&self.details_json)?,
    })
  }
}

/// Raw strings read directly from a `recommendations` row.
pub struct RawRecommendation {
  pub rec_code:            String,
  pub title:               String,
  pub description:         String,
  pub priority:            String,
  pub expected_impact_eur: f64,
  pub effort_level:        String,
  pub confidence:          String,
  pub category:            String,
  pub computed_at:         String,
}

impl RawRecommendation {
  pub fn into_recommendation(self) -> Result<Recommendation> {
    Ok(Recommendation {
      rec_code:            self.rec_code,
      title:               self.title,
      description:         self.description,
      priority:            decode_priority(&self.priority)?,
      expected_impact_eur: self.expected_impact_eur,
      effort_level:        decode_effort(&self.effort_level)?,
      confidence:          decode_confidence(&self.confidence)?,
      category:            self.category,
      computed_at:         decode_dt(&self.computed_at)?,
    })
  }
}
