//! KPI projection — flattens the extracted aggregates into the stable named
//! set consumed by scoring and recommendations.
//!
//! No independent arithmetic happens here; the projection exists so that
//! scorer and recommender never depend on the extractor's internal shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  answer::Answer,
  extract::{ExtractedData, extract_all},
};

// ─── Kpis ────────────────────────────────────────────────────────────────────

/// Top-line KPIs of one audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
  pub ca_total_12m:          f64,
  pub ca_recurrent_12m:      f64,
  pub pourcent_recurrent:    f64,
  pub arpm:                  f64,
  pub loyer_ratio:           f64,
  pub ca_par_m2:             f64,
  pub masse_salariale_ratio: f64,
  pub ebitda_estime:         f64,
  pub marge_ebitda:          f64,
  pub churn_mensuel:         f64,
  pub conversion_essai:      f64,
  pub occupation_moyenne:    f64,
  pub loyer_net_annuel:      f64,
}

impl Kpis {
  pub fn from_extracted(data: &ExtractedData) -> Self {
    Self {
      ca_total_12m:          data.finance.revenus.ca_total,
      ca_recurrent_12m:      data.finance.revenus.ca_recurrent,
      pourcent_recurrent:    data.finance.revenus.pourcent_recurrent,
      arpm:                  data.membres.arpm,
      loyer_ratio:           data.finance.ratios.loyer_ca_ratio,
      ca_par_m2:             data.operations.ca_par_m2,
      masse_salariale_ratio: data.finance.ratios.ms_ca_ratio,
      ebitda_estime:         data.finance.resultat.ebitda,
      marge_ebitda:          data.finance.resultat.marge_ebitda,
      churn_mensuel:         data.operations.taux_churn_pct,
      conversion_essai:      data.operations.taux_conversion_pct,
      occupation_moyenne:    data.operations.taux_occupation_global_pct,
      loyer_net_annuel:      data.finance.charges.loyer_annuel_total,
    }
  }

  /// Flatten into persistable records, one per KPI code.
  pub fn to_records(
    &self,
    audit_id: Uuid,
    computed_at: DateTime<Utc>,
  ) -> Vec<KpiRecord> {
    let record = |kpi_code: &str, value: f64, unit: &str| KpiRecord {
      audit_id,
      kpi_code: kpi_code.to_owned(),
      value,
      unit: unit.to_owned(),
      computed_at,
    };

    vec![
      record("ca_total_12m", self.ca_total_12m, "eur"),
      record("ca_recurrent_12m", self.ca_recurrent_12m, "eur"),
      record("pourcent_recurrent", self.pourcent_recurrent, "pourcent"),
      record("arpm", self.arpm, "eur_par_mois"),
      record("loyer_ratio", self.loyer_ratio, "pourcent"),
      record("ca_par_m2", self.ca_par_m2, "eur_par_m2"),
      record("masse_salariale_ratio", self.masse_salariale_ratio, "pourcent"),
      record("ebitda_estime", self.ebitda_estime, "eur"),
      record("marge_ebitda", self.marge_ebitda, "pourcent"),
      record("churn_mensuel", self.churn_mensuel, "pourcent"),
      record("conversion_essai", self.conversion_essai, "pourcent"),
      record("occupation_moyenne", self.occupation_moyenne, "pourcent"),
      record("loyer_net_annuel", self.loyer_net_annuel, "eur"),
    ]
  }
}

/// Compute the KPI set from one audit's answer snapshot.
pub fn calculate_kpis(answers: &[Answer]) -> Kpis {
  Kpis::from_extracted(&extract_all(answers))
}

// ─── KpiRecord ───────────────────────────────────────────────────────────────

/// One persisted KPI value, upserted per `(audit_id, kpi_code)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiRecord {
  pub audit_id:    Uuid,
  pub kpi_code:    String,
  pub value:       f64,
  pub unit:        String,
  pub computed_at: DateTime<Utc>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
