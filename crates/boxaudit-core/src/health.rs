//! Financial health score — a single /100 figure decomposed into
//! profitability (40 pts), treasury (30 pts) and cost structure (30 pts).
//!
//! Built on the same bracket combinators as pillar scoring, but the
//! brackets award component points that sum to the pillar budget instead
//! of 0-100 sub-scores.

use serde::{Deserialize, Serialize};

use crate::{extract::FinanceData, thresholds as th};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentabiliteHealth {
  pub score:             f64,
  pub marge_ebitda_score: f64,
  pub marge_nette_score:  f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TresorerieHealth {
  pub score:                  f64,
  pub jours_tresorerie_score: f64,
  pub ratio_liquidite_score:  f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureHealth {
  pub score:                  f64,
  pub ratio_loyer_score:      f64,
  pub ratio_ms_score:         f64,
  pub ratio_endettement_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialHealth {
  /// Total, clamped to `[0, 100]`.
  pub score:       f64,
  pub rentabilite: RentabiliteHealth,
  pub tresorerie:  TresorerieHealth,
  pub structure:   StructureHealth,
}

/// Score the financial health of one audit from its extracted finance data.
pub fn financial_health(finance: &FinanceData) -> FinancialHealth {
  let marge_ebitda_score = th::score_from_min(
    finance.resultat.marge_ebitda,
    th::HEALTH_EBITDA,
    th::HEALTH_EBITDA_DEFAULT,
  );
  let marge_nette_score = th::score_from_min(
    finance.resultat.marge_nette,
    th::HEALTH_MARGE_NETTE,
    th::HEALTH_MARGE_NETTE_DEFAULT,
  );
  let rentabilite = RentabiliteHealth {
    score: marge_ebitda_score + marge_nette_score,
    marge_ebitda_score,
    marge_nette_score,
  };

  let jours_tresorerie_score = th::score_from_min(
    finance.tresorerie.jours_tresorerie,
    th::HEALTH_JOURS_TRESORERIE,
    th::HEALTH_JOURS_TRESORERIE_DEFAULT,
  );
  let ratio_liquidite_score = th::score_from_min(
    finance.tresorerie.ratio_liquidite,
    th::HEALTH_LIQUIDITE,
    th::HEALTH_LIQUIDITE_DEFAULT,
  );
  let tresorerie = TresorerieHealth {
    score: jours_tresorerie_score + ratio_liquidite_score,
    jours_tresorerie_score,
    ratio_liquidite_score,
  };

  let ratio_loyer_score = th::score_from_max(
    finance.ratios.loyer_ca_ratio,
    th::HEALTH_LOYER,
    th::HEALTH_LOYER_DEFAULT,
  );
  let ratio_ms_score = th::score_from_range(
    finance.ratios.ms_ca_ratio,
    th::HEALTH_MASSE_SALARIALE,
    th::HEALTH_MASSE_SALARIALE_DEFAULT,
  );
  let ratio_endettement_score = th::score_from_max(
    finance.tresorerie.ratio_endettement,
    th::HEALTH_ENDETTEMENT,
    th::HEALTH_ENDETTEMENT_DEFAULT,
  );
  let structure = StructureHealth {
    score: ratio_loyer_score + ratio_ms_score + ratio_endettement_score,
    ratio_loyer_score,
    ratio_ms_score,
    ratio_endettement_score,
  };

  FinancialHealth {
    score: (rentabilite.score + tresorerie.score + structure.score)
      .clamp(0.0, 100.0),
    rentabilite,
    tresorerie,
    structure,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::extract::extract_finance_data;

  #[test]
  fn empty_audit_scores_the_neutral_floor() {
    let health = financial_health(&extract_finance_data(&[]));

    // Zero margins sit at the bottom positive bracket; zero ratios score
    // their respective zero-value brackets.
    assert_eq!(health.rentabilite.marge_ebitda_score, 5.0);
    assert_eq!(health.rentabilite.marge_nette_score, 5.0);
    assert_eq!(health.tresorerie.jours_tresorerie_score, 3.0);
    assert_eq!(health.tresorerie.ratio_liquidite_score, 0.0);
    assert_eq!(health.structure.ratio_loyer_score, 10.0);
    assert_eq!(health.structure.ratio_ms_score, 2.0);
    assert_eq!(health.structure.ratio_endettement_score, 10.0);
    assert_eq!(health.score, 35.0);
  }

  #[test]
  fn total_is_the_sum_of_components() {
    let health = financial_health(&extract_finance_data(
      &crate::extract::tests::realistic_answers(),
    ));
    assert_eq!(
      health.score,
      health.rentabilite.score + health.tresorerie.score + health.structure.score
    );
    assert!(health.rentabilite.score <= 40.0);
    assert!(health.tresorerie.score <= 30.0);
    assert!(health.structure.score <= 30.0);
  }

  #[test]
  fn negative_margins_zero_the_profitability_block() {
    let mut finance = extract_finance_data(&[]);
    finance.resultat.marge_ebitda = -5.0;
    finance.resultat.marge_nette = -10.0;

    let health = financial_health(&finance);
    assert_eq!(health.rentabilite.score, 0.0);
  }

  #[test]
  fn extreme_ratios_fall_to_zero_points() {
    let mut finance = extract_finance_data(&[]);
    finance.ratios.loyer_ca_ratio = 30.0;
    finance.tresorerie.ratio_endettement = 150.0;

    let health = financial_health(&finance);
    assert_eq!(health.structure.ratio_loyer_score, 0.0);
    assert_eq!(health.structure.ratio_endettement_score, 0.0);
  }
}
