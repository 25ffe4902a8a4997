//! Scoring thresholds and weights — the fixed business constants behind
//! pillar scoring, recommendations, and the financial health score.
//!
//! Every ladder is data, not code: an ordered slice of brackets scanned
//! first-match-wins by one of the three combinators below. Three families
//! exist — higher-is-better ([`MinBracket`]), lower-is-better
//! ([`MaxBracket`]), and optimal-range ([`RangeBracket`]).

// ─── Bracket types and combinators ───────────────────────────────────────────

/// Higher-is-better: first bracket with `value >= min` wins.
/// Brackets are ordered by descending `min`.
#[derive(Debug, Clone, Copy)]
pub struct MinBracket {
  pub min:   f64,
  pub score: f64,
}

/// Lower-is-better: first bracket with `value <= max` wins.
/// Brackets are ordered by ascending `max`.
#[derive(Debug, Clone, Copy)]
pub struct MaxBracket {
  pub max:   f64,
  pub score: f64,
}

/// Optimal-range: first bracket containing `value` wins.
/// Brackets are ordered narrowest-first.
#[derive(Debug, Clone, Copy)]
pub struct RangeBracket {
  pub min:   f64,
  pub max:   f64,
  pub score: f64,
}

pub fn score_from_min(value: f64, brackets: &[MinBracket], fallback: f64) -> f64 {
  brackets
    .iter()
    .find(|b| value >= b.min)
    .map_or(fallback, |b| b.score)
}

pub fn score_from_max(value: f64, brackets: &[MaxBracket], fallback: f64) -> f64 {
  brackets
    .iter()
    .find(|b| value <= b.max)
    .map_or(fallback, |b| b.score)
}

pub fn score_from_range(
  value: f64,
  brackets: &[RangeBracket],
  fallback: f64,
) -> f64 {
  brackets
    .iter()
    .find(|b| value >= b.min && value <= b.max)
    .map_or(fallback, |b| b.score)
}

// ─── Pillar scoring ladders ──────────────────────────────────────────────────

/// Marge EBITDA (%) — higher is better.
pub const MARGE_EBITDA: &[MinBracket] = &[
  MinBracket { min: 25.0, score: 100.0 },
  MinBracket { min: 20.0, score: 90.0 },
  MinBracket { min: 15.0, score: 75.0 },
  MinBracket { min: 10.0, score: 60.0 },
  MinBracket { min: 5.0, score: 40.0 },
  MinBracket { min: 0.0, score: 25.0 },
];
pub const MARGE_EBITDA_DEFAULT: f64 = 10.0;

/// Ratio loyer/CA (%) — lower is better.
pub const LOYER_RATIO: &[MaxBracket] = &[
  MaxBracket { max: 12.0, score: 100.0 },
  MaxBracket { max: 15.0, score: 85.0 },
  MaxBracket { max: 18.0, score: 70.0 },
  MaxBracket { max: 22.0, score: 50.0 },
  MaxBracket { max: 25.0, score: 30.0 },
];
pub const LOYER_RATIO_DEFAULT: f64 = 10.0;

/// Masse salariale / CA (%) — optimal zone around 30-40%. Values below every
/// zone fall into the widest bracket (score 50); only above 55% does the
/// fallback apply.
pub const MASSE_SALARIALE: &[RangeBracket] = &[
  RangeBracket { min: 30.0, max: 40.0, score: 100.0 },
  RangeBracket { min: 25.0, max: 45.0, score: 85.0 },
  RangeBracket { min: 20.0, max: 50.0, score: 70.0 },
  RangeBracket { min: 0.0, max: 55.0, score: 50.0 },
];
pub const MASSE_SALARIALE_DEFAULT: f64 = 25.0;

/// CA par m² (EUR) — higher is better.
pub const CA_PAR_M2: &[MinBracket] = &[
  MinBracket { min: 400.0, score: 100.0 },
  MinBracket { min: 300.0, score: 85.0 },
  MinBracket { min: 250.0, score: 75.0 },
  MinBracket { min: 200.0, score: 60.0 },
  MinBracket { min: 150.0, score: 40.0 },
];
pub const CA_PAR_M2_DEFAULT: f64 = 25.0;

/// Part de CA récurrent (%) — higher is better.
pub const RECURRENCE: &[MinBracket] = &[
  MinBracket { min: 90.0, score: 100.0 },
  MinBracket { min: 85.0, score: 90.0 },
  MinBracket { min: 80.0, score: 80.0 },
  MinBracket { min: 70.0, score: 65.0 },
  MinBracket { min: 60.0, score: 45.0 },
];
pub const RECURRENCE_DEFAULT: f64 = 25.0;

/// ARPM (EUR/mois) — higher is better.
pub const ARPM: &[MinBracket] = &[
  MinBracket { min: 110.0, score: 100.0 },
  MinBracket { min: 95.0, score: 90.0 },
  MinBracket { min: 85.0, score: 80.0 },
  MinBracket { min: 75.0, score: 65.0 },
  MinBracket { min: 65.0, score: 50.0 },
];
pub const ARPM_DEFAULT: f64 = 30.0;

/// Churn mensuel (%) — lower is better.
pub const CHURN: &[MaxBracket] = &[
  MaxBracket { max: 2.0, score: 100.0 },
  MaxBracket { max: 3.0, score: 90.0 },
  MaxBracket { max: 5.0, score: 75.0 },
  MaxBracket { max: 7.0, score: 55.0 },
  MaxBracket { max: 10.0, score: 35.0 },
];
pub const CHURN_DEFAULT: f64 = 15.0;

/// Occupation moyenne (%) — higher is better.
pub const OCCUPATION: &[MinBracket] = &[
  MinBracket { min: 85.0, score: 100.0 },
  MinBracket { min: 75.0, score: 90.0 },
  MinBracket { min: 70.0, score: 80.0 },
  MinBracket { min: 65.0, score: 70.0 },
  MinBracket { min: 55.0, score: 55.0 },
  MinBracket { min: 45.0, score: 40.0 },
];
pub const OCCUPATION_DEFAULT: f64 = 25.0;

/// Conversion essai → abonnement (%) — higher is better.
pub const CONVERSION: &[MinBracket] = &[
  MinBracket { min: 60.0, score: 100.0 },
  MinBracket { min: 50.0, score: 90.0 },
  MinBracket { min: 40.0, score: 75.0 },
  MinBracket { min: 30.0, score: 55.0 },
  MinBracket { min: 20.0, score: 35.0 },
];
pub const CONVERSION_DEFAULT: f64 = 20.0;

// ─── Pillar weights ──────────────────────────────────────────────────────────

// Internal sub-score weights per pillar.
pub const FINANCE_W_RENTABILITE: f64 = 0.4;
pub const FINANCE_W_LOYER: f64 = 0.2;
pub const FINANCE_W_MASSE_SALARIALE: f64 = 0.2;
pub const FINANCE_W_CA_M2: f64 = 0.2;

pub const CLIENTELE_W_RECURRENCE: f64 = 0.4;
pub const CLIENTELE_W_ARPM: f64 = 0.35;
pub const CLIENTELE_W_CHURN: f64 = 0.25;

pub const EXPLOITATION_W_OCCUPATION: f64 = 0.6;
pub const EXPLOITATION_W_CONVERSION: f64 = 0.4;

// Global pillar weights; must sum to 1.
pub const GLOBAL_W_FINANCE: f64 = 0.30;
pub const GLOBAL_W_CLIENTELE: f64 = 0.35;
pub const GLOBAL_W_EXPLOITATION: f64 = 0.35;

// ─── Recommendation triggers ─────────────────────────────────────────────────

pub const TRIGGER_MARGE_EBITDA: f64 = 15.0;
pub const TRIGGER_LOYER_RATIO: f64 = 18.0;
pub const TRIGGER_ARPM: f64 = 80.0;
pub const TRIGGER_CHURN_MENSUEL: f64 = 5.0;
pub const TRIGGER_OCCUPATION: f64 = 65.0;
pub const TRIGGER_CONVERSION: f64 = 40.0;
pub const TRIGGER_RECURRENT: f64 = 80.0;

// ─── Financial health score brackets ─────────────────────────────────────────
//
// Component points sum to 100: rentabilité 40 (25 + 15), trésorerie 30
// (20 + 10), structure 30 (10 + 10 + 10).

pub const HEALTH_EBITDA: &[MinBracket] = &[
  MinBracket { min: 25.0, score: 25.0 },
  MinBracket { min: 20.0, score: 22.0 },
  MinBracket { min: 15.0, score: 18.0 },
  MinBracket { min: 10.0, score: 14.0 },
  MinBracket { min: 5.0, score: 10.0 },
  MinBracket { min: 0.0, score: 5.0 },
];
pub const HEALTH_EBITDA_DEFAULT: f64 = 0.0;

pub const HEALTH_MARGE_NETTE: &[MinBracket] = &[
  MinBracket { min: 15.0, score: 15.0 },
  MinBracket { min: 10.0, score: 12.0 },
  MinBracket { min: 5.0, score: 9.0 },
  MinBracket { min: 0.0, score: 5.0 },
];
pub const HEALTH_MARGE_NETTE_DEFAULT: f64 = 0.0;

pub const HEALTH_JOURS_TRESORERIE: &[MinBracket] = &[
  MinBracket { min: 90.0, score: 20.0 },
  MinBracket { min: 60.0, score: 16.0 },
  MinBracket { min: 30.0, score: 12.0 },
  MinBracket { min: 15.0, score: 7.0 },
];
pub const HEALTH_JOURS_TRESORERIE_DEFAULT: f64 = 3.0;

pub const HEALTH_LIQUIDITE: &[MinBracket] = &[
  MinBracket { min: 2.0, score: 10.0 },
  MinBracket { min: 1.5, score: 8.0 },
  MinBracket { min: 1.0, score: 6.0 },
  MinBracket { min: 0.5, score: 3.0 },
];
pub const HEALTH_LIQUIDITE_DEFAULT: f64 = 0.0;

pub const HEALTH_LOYER: &[MaxBracket] = &[
  MaxBracket { max: 12.0, score: 10.0 },
  MaxBracket { max: 15.0, score: 8.0 },
  MaxBracket { max: 20.0, score: 6.0 },
  MaxBracket { max: 25.0, score: 3.0 },
];
pub const HEALTH_LOYER_DEFAULT: f64 = 0.0;

pub const HEALTH_MASSE_SALARIALE: &[RangeBracket] = &[
  RangeBracket { min: 30.0, max: 40.0, score: 10.0 },
  RangeBracket { min: 25.0, max: 45.0, score: 8.0 },
  RangeBracket { min: 20.0, max: 50.0, score: 5.0 },
];
pub const HEALTH_MASSE_SALARIALE_DEFAULT: f64 = 2.0;

pub const HEALTH_ENDETTEMENT: &[MaxBracket] = &[
  MaxBracket { max: 30.0, score: 10.0 },
  MaxBracket { max: 50.0, score: 8.0 },
  MaxBracket { max: 80.0, score: 5.0 },
  MaxBracket { max: 100.0, score: 3.0 },
];
pub const HEALTH_ENDETTEMENT_DEFAULT: f64 = 0.0;

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn min_brackets_scan_first_match() {
    assert_eq!(score_from_min(25.0, MARGE_EBITDA, MARGE_EBITDA_DEFAULT), 100.0);
    assert_eq!(score_from_min(17.0, MARGE_EBITDA, MARGE_EBITDA_DEFAULT), 75.0);
    assert_eq!(score_from_min(0.0, MARGE_EBITDA, MARGE_EBITDA_DEFAULT), 25.0);
    assert_eq!(score_from_min(-3.0, MARGE_EBITDA, MARGE_EBITDA_DEFAULT), 10.0);
  }

  #[test]
  fn max_brackets_scan_first_match() {
    assert_eq!(score_from_max(2.0, CHURN, CHURN_DEFAULT), 100.0);
    assert_eq!(score_from_max(4.5, CHURN, CHURN_DEFAULT), 75.0);
    assert_eq!(score_from_max(12.0, CHURN, CHURN_DEFAULT), 15.0);
  }

  #[test]
  fn range_brackets_prefer_narrowest_zone() {
    let d = MASSE_SALARIALE_DEFAULT;
    assert_eq!(score_from_range(35.0, MASSE_SALARIALE, d), 100.0);
    assert_eq!(score_from_range(27.0, MASSE_SALARIALE, d), 85.0);
    assert_eq!(score_from_range(48.0, MASSE_SALARIALE, d), 70.0);
    // Below every optimal zone still lands in the widest bracket.
    assert_eq!(score_from_range(10.0, MASSE_SALARIALE, d), 50.0);
    // Only above 55% does the fallback apply.
    assert_eq!(score_from_range(60.0, MASSE_SALARIALE, d), 25.0);
  }

  #[test]
  fn health_components_sum_to_one_hundred() {
    let best = score_from_min(99.0, HEALTH_EBITDA, HEALTH_EBITDA_DEFAULT)
      + score_from_min(99.0, HEALTH_MARGE_NETTE, HEALTH_MARGE_NETTE_DEFAULT)
      + score_from_min(999.0, HEALTH_JOURS_TRESORERIE, HEALTH_JOURS_TRESORERIE_DEFAULT)
      + score_from_min(9.0, HEALTH_LIQUIDITE, HEALTH_LIQUIDITE_DEFAULT)
      + score_from_max(5.0, HEALTH_LOYER, HEALTH_LOYER_DEFAULT)
      + score_from_range(35.0, HEALTH_MASSE_SALARIALE, HEALTH_MASSE_SALARIALE_DEFAULT)
      + score_from_max(10.0, HEALTH_ENDETTEMENT, HEALTH_ENDETTEMENT_DEFAULT);
    assert_eq!(best, 100.0);
  }
}
