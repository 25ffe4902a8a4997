//! SQL schema for the box-audit SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS audits (
    audit_id    TEXT PRIMARY KEY,
    gym_name    TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'draft',  -- 'draft' | 'in_progress' | 'completed'
    created_at  TEXT NOT NULL                   -- ISO 8601 UTC; server-assigned
);

-- At most one live value per question; writes are last-write-wins.
CREATE TABLE IF NOT EXISTS answers (
    audit_id      TEXT NOT NULL REFERENCES audits(audit_id) ON DELETE CASCADE,
    block_code    TEXT NOT NULL,
    question_code TEXT NOT NULL,
    value_kind    TEXT NOT NULL,   -- discriminant of AnswerValue variant
    value_json    TEXT NOT NULL,   -- JSON payload (inner data only)
    UNIQUE (audit_id, block_code, question_code)
);

-- Derived rows below are owned by the last pipeline run.
CREATE TABLE IF NOT EXISTS kpis (
    audit_id    TEXT NOT NULL REFERENCES audits(audit_id) ON DELETE CASCADE,
    kpi_code    TEXT NOT NULL,
    value       REAL NOT NULL,
    unit        TEXT NOT NULL,
    computed_at TEXT NOT NULL,
    UNIQUE (audit_id, kpi_code)
);

CREATE TABLE IF NOT EXISTS scores (
    audit_id     TEXT NOT NULL REFERENCES audits(audit_id) ON DELETE CASCADE,
    pillar_code  TEXT NOT NULL,
    pillar_name  TEXT NOT NULL,
    score        INTEGER NOT NULL,
    weight       REAL NOT NULL,
    details_json TEXT NOT NULL DEFAULT '{}',
    UNIQUE (audit_id, pillar_code)
);

-- Replaced wholesale on every pipeline run, never upserted row by row.
CREATE TABLE IF NOT EXISTS recommendations (
    audit_id            TEXT NOT NULL REFERENCES audits(audit_id) ON DELETE CASCADE,
    rec_code            TEXT NOT NULL,
    title               TEXT NOT NULL,
    description         TEXT NOT NULL,
    priority            TEXT NOT NULL,   -- 'P1' | 'P2' | 'P3'
    expected_impact_eur REAL NOT NULL,
    effort_level        TEXT NOT NULL,   -- 'facile' | 'moyen' | 'difficile'
    confidence          TEXT NOT NULL,   -- 'faible' | 'moyen' | 'fort'
    category            TEXT NOT NULL,
    computed_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS answers_audit_idx         ON answers(audit_id);
CREATE INDEX IF NOT EXISTS kpis_audit_idx            ON kpis(audit_id);
CREATE INDEX IF NOT EXISTS scores_audit_idx          ON scores(audit_id);
CREATE INDEX IF NOT EXISTS recommendations_audit_idx ON recommendations(audit_id);

PRAGMA user_version = 1;
";
