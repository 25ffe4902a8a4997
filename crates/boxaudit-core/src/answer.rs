//! Answer types — the raw input of the audit pipeline.
//!
//! An answer is one questionnaire field value, keyed by `(audit_id,
//! block_code, question_code)`. At most one live value exists per key; the
//! form UI re-submits on every edit and the store applies last-write-wins.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

// ─── AnswerValue ─────────────────────────────────────────────────────────────

/// The typed payload of an answer. The variant name serves as the
/// `value_kind` discriminant stored in the database.
///
/// Form inputs do not guarantee numeric typing: a numeric field may arrive
/// as [`AnswerValue::Text`] (`"9500"`). All arithmetic goes through
/// [`AnswerValue::as_number`], which parses explicitly — nothing in the
/// pipeline ever concatenates where it meant to add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AnswerValue {
  Number(f64),
  Text(String),
  Bool(bool),
  /// Multi-select questions.
  List(Vec<String>),
}

impl AnswerValue {
  /// The discriminant string stored in the `value_kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Number(_) => "number",
      Self::Text(_) => "text",
      Self::Bool(_) => "bool",
      Self::List(_) => "list",
    }
  }

  /// Serialise the inner payload (without the type tag) for the `value_json`
  /// database column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    // The full serialised form is `{"type": "...", "data": <payload>}`.
    // We want only the payload.
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Deserialise from the discriminant string and JSON payload stored in the
  /// database.
  pub fn from_parts(
    discriminant: &str,
    data: serde_json::Value,
  ) -> Result<Self> {
    if !matches!(discriminant, "number" | "text" | "bool" | "list") {
      return Err(crate::Error::UnknownValueKind(discriminant.to_owned()));
    }
    let wrapped = serde_json::json!({ "type": discriminant, "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }

  /// Explicit numeric coercion. `Number` passes through; `Text` is parsed
  /// after trimming. Booleans, lists, and unparseable or non-finite text
  /// yield `None` — callers substitute their own default.
  pub fn as_number(&self) -> Option<f64> {
    match self {
      Self::Number(n) if n.is_finite() => Some(*n),
      Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }
}

// ─── Answer ──────────────────────────────────────────────────────────────────

/// One live questionnaire value for one audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
  pub audit_id:      Uuid,
  pub block_code:    String,
  pub question_code: String,
  pub value:         AnswerValue,
}

// ─── NewAnswer ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::AuditStore::upsert_answers`]. The audit id comes
/// from the call site (URL path), not the body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAnswer {
  pub block_code:    String,
  pub question_code: String,
  pub value:         AnswerValue,
}

impl NewAnswer {
  pub fn into_answer(self, audit_id: Uuid) -> Answer {
    Answer {
      audit_id,
      block_code: self.block_code,
      question_code: self.question_code,
      value: self.value,
    }
  }
}

// ─── AnswerSet ───────────────────────────────────────────────────────────────

/// Read-only lookup over one audit's answer snapshot.
///
/// Every accessor is total: a missing or mistyped answer yields the caller's
/// default, never an error. This is what makes the extractors total over
/// arbitrary (including empty) input.
#[derive(Debug, Clone, Copy)]
pub struct AnswerSet<'a> {
  answers: &'a [Answer],
}

impl<'a> AnswerSet<'a> {
  pub fn new(answers: &'a [Answer]) -> Self { Self { answers } }

  fn find(&self, block: &str, question: &str) -> Option<&'a AnswerValue> {
    self
      .answers
      .iter()
      .find(|a| a.block_code == block && a.question_code == question)
      .map(|a| &a.value)
  }

  /// Numeric value of `(block, question)`, or `0.0` when absent.
  pub fn num(&self, block: &str, question: &str) -> f64 {
    self.num_or(block, question, 0.0)
  }

  /// Numeric value of `(block, question)`, or `default` when absent or
  /// non-numeric.
  pub fn num_or(&self, block: &str, question: &str, default: f64) -> f64 {
    self
      .find(block, question)
      .and_then(AnswerValue::as_number)
      .unwrap_or(default)
  }

  /// First non-zero numeric value among several question codes in `block`.
  /// Mirrors the questionnaire's renamed-field fallback chains.
  pub fn first_num(&self, block: &str, questions: &[&str]) -> f64 {
    questions
      .iter()
      .map(|q| self.num(block, q))
      .find(|n| *n != 0.0)
      .unwrap_or(0.0)
  }

  pub fn text(&self, block: &str, question: &str) -> &'a str {
    self
      .find(block, question)
      .and_then(AnswerValue::as_text)
      .unwrap_or("")
  }

  pub fn flag(&self, block: &str, question: &str) -> bool {
    self
      .find(block, question)
      .and_then(AnswerValue::as_bool)
      .unwrap_or(false)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
