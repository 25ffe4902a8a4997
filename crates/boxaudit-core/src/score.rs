//! Pillar scoring — maps the KPI set onto three weighted 0-100 pillar
//! scores and a weighted global score.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{kpi::Kpis, thresholds as th};

// ─── Types ───────────────────────────────────────────────────────────────────

/// One pillar's score for one audit run. Persisted via upsert keyed on
/// `(audit_id, pillar_code)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PillarScore {
  pub pillar_code: String,
  pub pillar_name: String,
  /// Rounded integer in `[0, 100]`.
  pub score:       u8,
  /// Weight of this pillar in the global score.
  pub weight:      f64,
  /// Input KPIs and sub-scores, for the dashboard drill-down.
  pub details:     serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
  pub scores:       Vec<PillarScore>,
  pub global_score: u8,
}

/// Weighted global score over a persisted score set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalScore {
  pub score:        u8,
  pub pillar_count: usize,
}

// ─── Scoring ─────────────────────────────────────────────────────────────────

fn round_score(raw: f64) -> u8 { raw.clamp(0.0, 100.0).round() as u8 }

/// Score the three pillars and the weighted global score.
pub fn calculate_scores(kpis: &Kpis) -> ScoreReport {
  let mut scores = Vec::with_capacity(3);

  // Finance: profitability, rent, payroll, revenue density.
  let score_rentabilite =
    th::score_from_min(kpis.marge_ebitda, th::MARGE_EBITDA, th::MARGE_EBITDA_DEFAULT);
  let score_loyer =
    th::score_from_max(kpis.loyer_ratio, th::LOYER_RATIO, th::LOYER_RATIO_DEFAULT);
  let score_ms = th::score_from_range(
    kpis.masse_salariale_ratio,
    th::MASSE_SALARIALE,
    th::MASSE_SALARIALE_DEFAULT,
  );
  let score_ca_m2 =
    th::score_from_min(kpis.ca_par_m2, th::CA_PAR_M2, th::CA_PAR_M2_DEFAULT);

  scores.push(PillarScore {
    pillar_code: "finance".to_owned(),
    pillar_name: "Finance".to_owned(),
    score:       round_score(
      score_rentabilite * th::FINANCE_W_RENTABILITE
        + score_loyer * th::FINANCE_W_LOYER
        + score_ms * th::FINANCE_W_MASSE_SALARIALE
        + score_ca_m2 * th::FINANCE_W_CA_M2,
    ),
    weight:      th::GLOBAL_W_FINANCE,
    details:     json!({
      "marge_ebitda": kpis.marge_ebitda,
      "loyer_ratio": kpis.loyer_ratio,
      "masse_salariale_ratio": kpis.masse_salariale_ratio,
      "ca_par_m2": kpis.ca_par_m2,
      "score_rentabilite": score_rentabilite,
      "score_loyer": score_loyer,
      "score_ms": score_ms,
      "score_ca_m2": score_ca_m2,
    }),
  });

  // Clientèle: recurring revenue share, ARPM, churn.
  let score_recurrence =
    th::score_from_min(kpis.pourcent_recurrent, th::RECURRENCE, th::RECURRENCE_DEFAULT);
  let score_arpm = th::score_from_min(kpis.arpm, th::ARPM, th::ARPM_DEFAULT);
  let score_churn =
    th::score_from_max(kpis.churn_mensuel, th::CHURN, th::CHURN_DEFAULT);

  scores.push(PillarScore {
    pillar_code: "clientele".to_owned(),
    pillar_name: "Commercial & rétention".to_owned(),
    score:       round_score(
      score_recurrence * th::CLIENTELE_W_RECURRENCE
        + score_arpm * th::CLIENTELE_W_ARPM
        + score_churn * th::CLIENTELE_W_CHURN,
    ),
    weight:      th::GLOBAL_W_CLIENTELE,
    details:     json!({
      "pourcent_recurrent": kpis.pourcent_recurrent,
      "arpm": kpis.arpm,
      "churn_mensuel": kpis.churn_mensuel,
      "score_recurrence": score_recurrence,
      "score_arpm": score_arpm,
      "score_churn": score_churn,
    }),
  });

  // Exploitation: occupancy, trial conversion.
  let score_occupation =
    th::score_from_min(kpis.occupation_moyenne, th::OCCUPATION, th::OCCUPATION_DEFAULT);
  let score_conversion =
    th::score_from_min(kpis.conversion_essai, th::CONVERSION, th::CONVERSION_DEFAULT);

  scores.push(PillarScore {
    pillar_code: "exploitation".to_owned(),
    pillar_name: "Organisation & pilotage".to_owned(),
    score:       round_score(
      score_occupation * th::EXPLOITATION_W_OCCUPATION
        + score_conversion * th::EXPLOITATION_W_CONVERSION,
    ),
    weight:      th::GLOBAL_W_EXPLOITATION,
    details:     json!({
      "occupation_moyenne": kpis.occupation_moyenne,
      "conversion_essai": kpis.conversion_essai,
      "score_occupation": score_occupation,
      "score_conversion": score_conversion,
    }),
  });

  let global_score = round_score(
    scores
      .iter()
      .map(|s| f64::from(s.score) * s.weight)
      .sum::<f64>(),
  );

  ScoreReport { scores, global_score }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
