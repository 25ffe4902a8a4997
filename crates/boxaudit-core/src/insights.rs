//! Dashboard insights computed on demand from the answer snapshot:
//! schedule heat map, churn-risk analysis, and pricing position.
//!
//! None of these are persisted — they are pure projections served directly
//! by the API.

use serde::{Deserialize, Serialize};

use crate::{answer::{Answer, AnswerSet}, extract::extract_all};

// ─── Schedule heat map ───────────────────────────────────────────────────────

pub const TIME_SLOTS: [&str; 6] =
  ["6h-9h", "9h-12h", "12h-14h", "14h-17h", "17h-19h", "19h-21h"];

pub const DAYS: [&str; 7] = [
  "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
];

const DAY_CODES: [&str; 7] = [
  "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupancyLevel {
  #[serde(rename = "saturé")]
  Sature,
  #[serde(rename = "bon")]
  Bon,
  #[serde(rename = "moyen")]
  Moyen,
  #[serde(rename = "faible")]
  Faible,
}

impl OccupancyLevel {
  fn from_value(value: f64) -> Self {
    if value > 90.0 {
      Self::Sature
    } else if value >= 60.0 {
      Self::Bon
    } else if value >= 30.0 {
      Self::Moyen
    } else {
      Self::Faible
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatMapCell {
  pub day:   String,
  pub slot:  String,
  /// Estimated occupancy in `[0, 100]`.
  pub value: u8,
  pub level: OccupancyLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleHeatMap {
  pub time_slots: Vec<String>,
  pub days:       Vec<String>,
  pub cells:      Vec<HeatMapCell>,
}

/// Estimate occupancy per (day, time slot) from the global per-slot rates,
/// weighted by each day's class count. Weekends shift towards mornings.
pub fn schedule_heat_map(answers: &[Answer]) -> ScheduleHeatMap {
  let set = AnswerSet::new(answers);

  let slot_values: Vec<f64> = [
    "occupation_6h_9h",
    "occupation_9h_12h",
    "occupation_12h_14h",
    "occupation_14h_17h",
    "occupation_17h_19h",
    "occupation_19h_21h",
  ]
  .iter()
  .map(|q| set.num("capacite_occupation", q))
  .collect();

  let courses_per_day: Vec<f64> = DAY_CODES
    .iter()
    .map(|d| set.num("structure_planning", &format!("nb_cours_{d}")))
    .collect();
  let max_courses = courses_per_day.iter().copied().fold(1.0, f64::max);

  let mut cells = Vec::with_capacity(DAYS.len() * TIME_SLOTS.len());
  for (d, day) in DAYS.iter().enumerate() {
    let day_factor = courses_per_day[d] / max_courses;
    let is_weekend = d >= 5;

    for (s, slot) in TIME_SLOTS.iter().enumerate() {
      let mut value = slot_values[s] * day_factor;
      if is_weekend {
        // More morning activity, quieter evenings.
        value *= if s <= 2 { 1.1 } else { 0.7 };
      }
      let value = value.clamp(0.0, 100.0);

      cells.push(HeatMapCell {
        day:   (*day).to_owned(),
        slot:  (*slot).to_owned(),
        value: value.round() as u8,
        level: OccupancyLevel::from_value(value),
      });
    }
  }

  ScheduleHeatMap {
    time_slots: TIME_SLOTS.iter().map(|s| (*s).to_owned()).collect(),
    days:       DAYS.iter().map(|d| (*d).to_owned()).collect(),
    cells,
  }
}

// ─── Churn risk ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnRiskLevel {
  #[serde(rename = "faible")]
  Faible,
  #[serde(rename = "modéré")]
  Modere,
  #[serde(rename = "élevé")]
  Eleve,
  #[serde(rename = "critique")]
  Critique,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnRiskFactor {
  pub name:   String,
  pub score:  f64,
  /// Human-readable measured value, e.g. `"8.0%"`.
  pub impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnRiskReport {
  pub risk_level: ChurnRiskLevel,
  /// Sum of factor scores, clamped to `[0, 100]`.
  pub risk_score: f64,
  pub factors:    Vec<ChurnRiskFactor>,
  pub actions:    Vec<String>,
}

/// Score five churn-risk factors and derive the recommended actions.
pub fn churn_risk(answers: &[Answer]) -> ChurnRiskReport {
  let set = AnswerSet::new(answers);
  let data = extract_all(answers);
  let mut factors = Vec::with_capacity(5);

  let churn = data.operations.taux_churn_pct;
  let churn_score = if churn > 8.0 {
    30.0
  } else if churn > 5.0 {
    20.0
  } else if churn > 3.0 {
    10.0
  } else {
    0.0
  };
  factors.push(ChurnRiskFactor {
    name:   "Taux de churn mensuel".to_owned(),
    score:  churn_score,
    impact: format!("{churn:.1}%"),
  });

  let frequentation =
    set.num("engagement_satisfaction", "frequentation_moyenne_semaine");
  let freq_score = if frequentation < 1.0 {
    25.0
  } else if frequentation < 2.0 {
    15.0
  } else if frequentation < 3.0 {
    5.0
  } else {
    0.0
  };
  factors.push(ChurnRiskFactor {
    name:   "Fréquentation moyenne".to_owned(),
    score:  freq_score,
    impact: format!("{frequentation} séances/sem"),
  });

  let inactifs =
    set.num("engagement_satisfaction", "nb_membres_inactifs_30j");
  let total = data.membres.nb_membres_actifs_total;
  let pct_inactifs = if total > 0.0 { inactifs / total * 100.0 } else { 0.0 };
  let inactif_score = if pct_inactifs > 20.0 {
    20.0
  } else if pct_inactifs > 10.0 {
    12.0
  } else if pct_inactifs > 5.0 {
    5.0
  } else {
    0.0
  };
  factors.push(ChurnRiskFactor {
    name:   "Membres inactifs >30j".to_owned(),
    score:  inactif_score,
    impact: format!("{pct_inactifs:.0}%"),
  });

  let nps = set.num("engagement_satisfaction", "nps_score");
  let nps_score = if nps < 0.0 {
    15.0
  } else if nps < 20.0 {
    10.0
  } else if nps < 40.0 {
    5.0
  } else {
    0.0
  };
  factors.push(ChurnRiskFactor {
    name:   "NPS Score".to_owned(),
    score:  nps_score,
    impact: format!("{nps}"),
  });

  let sans_engagement = data.membres.nb_membres_sans_engagement;
  let pct_sans_engagement =
    if total > 0.0 { sans_engagement / total * 100.0 } else { 0.0 };
  let engagement_score = if pct_sans_engagement > 50.0 {
    10.0
  } else if pct_sans_engagement > 30.0 {
    5.0
  } else {
    0.0
  };
  factors.push(ChurnRiskFactor {
    name:   "% sans engagement".to_owned(),
    score:  engagement_score,
    impact: format!("{pct_sans_engagement:.0}%"),
  });

  let total_score: f64 = factors.iter().map(|f| f.score).sum();
  let risk_level = if total_score >= 60.0 {
    ChurnRiskLevel::Critique
  } else if total_score >= 40.0 {
    ChurnRiskLevel::Eleve
  } else if total_score >= 20.0 {
    ChurnRiskLevel::Modere
  } else {
    ChurnRiskLevel::Faible
  };

  let mut actions = Vec::new();
  if churn_score >= 20.0 {
    actions.push(
      "Mettre en place un programme de rétention avec suivi personnalisé \
       des membres à risque"
        .to_owned(),
    );
  }
  if freq_score >= 15.0 {
    actions.push(
      "Lancer des challenges et programmes de fidélisation pour augmenter \
       la fréquentation"
        .to_owned(),
    );
  }
  if inactif_score >= 12.0 {
    actions.push(
      "Contacter les membres inactifs avec des offres de réactivation"
        .to_owned(),
    );
  }
  if nps_score >= 10.0 {
    actions.push(
      "Réaliser des enquêtes de satisfaction et adresser les points \
       d'insatisfaction"
        .to_owned(),
    );
  }
  if engagement_score >= 5.0 {
    actions.push(
      "Proposer des offres d'engagement avec avantages (réduction, \
       services inclus)"
        .to_owned(),
    );
  }
  if actions.is_empty() {
    actions.push(
      "Maintenir les actions de fidélisation actuelles et suivre les \
       indicateurs mensuellement"
        .to_owned(),
    );
  }

  ChurnRiskReport {
    risk_level,
    risk_score: total_score.clamp(0.0, 100.0),
    factors,
    actions,
  }
}

// ─── Pricing position ────────────────────────────────────────────────────────

/// Quadrant of the quality/price matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingQuadrant {
  /// High quality, high price.
  P1,
  /// High quality, low price.
  P2,
  /// Low quality, low price.
  P3,
  /// Low quality, high price.
  P4,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPosition {
  pub position:         PricingQuadrant,
  pub position_label:   String,
  pub prix_moyen_salle: f64,
  pub prix_moyen_zone:  f64,
  pub ecart_pct:        f64,
  pub qualite_score:    f64,
  pub recommandation:   String,
}

/// Position the box in a quality/price matrix against its market zone.
pub fn pricing_position(answers: &[Answer]) -> PricingPosition {
  let set = AnswerSet::new(answers);
  let data = extract_all(answers);

  // Reference price: unlimited plan, then 3x/week plan, then ARPM.
  let prix_illimite =
    set.num("tarification_detaillee", "prix_illimite_sans_engagement");
  let prix_3x = set.num("tarification_detaillee", "prix_3x_semaine");
  let prix_salle = if prix_illimite > 0.0 {
    prix_illimite
  } else if prix_3x > 0.0 {
    prix_3x
  } else {
    data.membres.arpm
  };

  let zone = set.text("localisation", "revenus_moyens_zone");
  let prix_zone = if zone.contains("Très élevés") {
    200.0
  } else if zone.contains("Élevés") {
    180.0
  } else if zone.contains("Faibles") {
    120.0
  } else {
    150.0
  };

  let ecart_pct = (prix_salle - prix_zone) / prix_zone * 100.0;

  let note_google = set.num("engagement_satisfaction", "note_moyenne_google");
  let nps = set.num("engagement_satisfaction", "nps_score");
  let etat_materiel =
    set.text("infrastructure_detaillee", "etat_general_materiel");
  let certif_score = data.rh.coaches_cf_l2
    + data.rh.coaches_cf_l3 * 2.0
    + data.rh.coaches_cf_l4 * 3.0;

  let mut qualite_score: f64 = 50.0;
  if note_google >= 4.5 {
    qualite_score += 15.0;
  } else if note_google >= 4.0 {
    qualite_score += 10.0;
  } else if note_google >= 3.5 {
    qualite_score += 5.0;
  }

  if nps >= 50.0 {
    qualite_score += 15.0;
  } else if nps >= 30.0 {
    qualite_score += 10.0;
  } else if nps >= 10.0 {
    qualite_score += 5.0;
  }

  qualite_score += match etat_materiel {
    "Excellent" => 10.0,
    "Bon" => 7.0,
    "Moyen" => 3.0,
    _ => 0.0,
  };

  if certif_score >= 5.0 {
    qualite_score += 10.0;
  } else if certif_score >= 3.0 {
    qualite_score += 5.0;
  }

  let qualite_score = qualite_score.clamp(0.0, 100.0);

  let qualite_haute = qualite_score >= 60.0;
  let prix_eleve = ecart_pct >= 0.0;

  let (position, position_label, recommandation) =
    match (qualite_haute, prix_eleve) {
      (true, true) => (
        PricingQuadrant::P1,
        "Premium justifié",
        "Votre positionnement premium est cohérent avec votre qualité. \
         Maintenez et communiquez sur votre valeur ajoutée.",
      ),
      (true, false) => (
        PricingQuadrant::P2,
        "Excellente valeur",
        "Votre qualité est supérieure à votre prix. Envisagez une \
         augmentation tarifaire progressive pour mieux valoriser votre \
         offre.",
      ),
      (false, false) => (
        PricingQuadrant::P3,
        "Entrée de gamme",
        "Investissez dans la qualité (certifications, équipement) pour \
         monter en gamme, ou assumez un positionnement accessible.",
      ),
      (false, true) => (
        PricingQuadrant::P4,
        "Prix élevé / Qualité insuffisante",
        "Attention: vos prix sont élevés mais la qualité perçue est \
         insuffisante. Améliorez rapidement l'expérience client ou ajustez \
         vos tarifs.",
      ),
    };

  PricingPosition {
    position,
    position_label: position_label.to_owned(),
    prix_moyen_salle: prix_salle,
    prix_moyen_zone: prix_zone,
    ecart_pct,
    qualite_score,
    recommandation: recommandation.to_owned(),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;
  use crate::answer::AnswerValue;

  fn num(block: &str, question: &str, value: f64) -> Answer {
    Answer {
      audit_id:      Uuid::nil(),
      block_code:    block.to_owned(),
      question_code: question.to_owned(),
      value:         AnswerValue::Number(value),
    }
  }

  fn text(block: &str, question: &str, value: &str) -> Answer {
    Answer {
      audit_id:      Uuid::nil(),
      block_code:    block.to_owned(),
      question_code: question.to_owned(),
      value:         AnswerValue::Text(value.to_owned()),
    }
  }

  #[test]
  fn heat_map_covers_every_day_slot_pair() {
    let answers = vec![
      num("capacite_occupation", "occupation_6h_9h", 70.0),
      num("capacite_occupation", "occupation_17h_19h", 95.0),
      num("structure_planning", "nb_cours_lundi", 8.0),
      num("structure_planning", "nb_cours_samedi", 4.0),
    ];
    let map = schedule_heat_map(&answers);

    assert_eq!(map.cells.len(), 42);
    for cell in &map.cells {
      assert!(cell.value <= 100);
    }

    // Monday has the most classes, so its evening peak keeps the full rate.
    let monday_evening = map
      .cells
      .iter()
      .find(|c| c.day == "Lundi" && c.slot == "17h-19h")
      .unwrap();
    assert_eq!(monday_evening.value, 95);
    assert_eq!(monday_evening.level, OccupancyLevel::Sature);

    // Saturday evenings are dampened below the morning slots.
    let saturday_evening = map
      .cells
      .iter()
      .find(|c| c.day == "Samedi" && c.slot == "17h-19h")
      .unwrap();
    let saturday_morning = map
      .cells
      .iter()
      .find(|c| c.day == "Samedi" && c.slot == "6h-9h")
      .unwrap();
    assert!(saturday_evening.value < saturday_morning.value);
  }

  #[test]
  fn churn_risk_is_modere_for_an_empty_audit() {
    let report = churn_risk(&[]);
    // No members and no churn data: only the low-frequency factor fires.
    assert_eq!(report.risk_score, 25.0 + 10.0);
    assert_eq!(report.risk_level, ChurnRiskLevel::Modere);
    assert_eq!(report.factors.len(), 5);
    assert!(!report.actions.is_empty());
  }

  #[test]
  fn churn_risk_escalates_with_bad_signals() {
    let answers = vec![
      num("structure_base", "nb_membres_actifs_total", 100.0),
      num("structure_base", "nb_membres_sans_engagement", 60.0),
      num("retention_churn", "resiliations_mensuelles", 9.0),
      num("engagement_satisfaction", "frequentation_moyenne_semaine", 0.5),
      num("engagement_satisfaction", "nb_membres_inactifs_30j", 25.0),
      num("engagement_satisfaction", "nps_score", -5.0),
    ];
    let report = churn_risk(&answers);

    // 30 + 25 + 20 + 15 + 10 = 100.
    assert_eq!(report.risk_score, 100.0);
    assert_eq!(report.risk_level, ChurnRiskLevel::Critique);
    assert_eq!(report.actions.len(), 5);
  }

  #[test]
  fn pricing_premium_quadrant_for_quality_above_zone_price() {
    let answers = vec![
      num("tarification_detaillee", "prix_illimite_sans_engagement", 160.0),
      text("localisation", "revenus_moyens_zone", "Revenus moyens"),
      num("engagement_satisfaction", "note_moyenne_google", 4.8),
      num("engagement_satisfaction", "nps_score", 55.0),
      text("infrastructure_detaillee", "etat_general_materiel", "Excellent"),
    ];
    let position = pricing_position(&answers);

    assert_eq!(position.position, PricingQuadrant::P1);
    assert_eq!(position.prix_moyen_zone, 150.0);
    assert!(position.ecart_pct > 0.0);
    assert!(position.qualite_score >= 60.0);
  }

  #[test]
  fn pricing_warns_on_expensive_low_quality() {
    let answers = vec![
      num("tarification_detaillee", "prix_illimite_sans_engagement", 190.0),
      text("localisation", "revenus_moyens_zone", "Revenus faibles... Faibles"),
      num("engagement_satisfaction", "note_moyenne_google", 3.0),
    ];
    let position = pricing_position(&answers);

    assert_eq!(position.position, PricingQuadrant::P4);
    assert_eq!(position.prix_moyen_zone, 120.0);
  }

  #[test]
  fn pricing_falls_back_to_arpm_when_no_plan_prices() {
    let position = pricing_position(&[]);
    assert_eq!(position.prix_moyen_salle, 0.0);
    assert_eq!(position.position, PricingQuadrant::P3);
  }
}
