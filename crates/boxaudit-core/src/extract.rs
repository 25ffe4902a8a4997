//! Data extraction — turns a flat answer snapshot into structured
//! finance / membres / operations / RH aggregates.
//!
//! Every extractor is a total pure function: missing answers default to
//! zero (or the documented business default), and every ratio guards the
//! zero-denominator case by returning `0`, never `NaN` or infinity.
//!
//! Revenue and charge lines are annual figures; sums are plain additions
//! with no per-period normalisation.

use serde::Serialize;

use crate::answer::{Answer, AnswerSet};

/// `numerator / denominator × 100`, or `0` when the denominator is zero.
fn pct(numerator: f64, denominator: f64) -> f64 {
  if denominator > 0.0 {
    numerator / denominator * 100.0
  } else {
    0.0
  }
}

/// `numerator / denominator`, or `0` when the denominator is zero.
fn ratio(numerator: f64, denominator: f64) -> f64 {
  if denominator > 0.0 {
    numerator / denominator
  } else {
    0.0
  }
}

// ─── Finance ─────────────────────────────────────────────────────────────────

/// Annual revenue, split by subscription line and grouped non-recurring
/// categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Revenus {
  pub ca_abonnements_mensuels:     f64,
  pub ca_abonnements_trimestriels: f64,
  pub ca_abonnements_semestriels:  f64,
  pub ca_abonnements_annuels:      f64,
  /// Cartes 10/20 séances.
  pub ca_cartes:                   f64,
  /// Personal training, nutrition, suivi remote, cours spécialisés.
  pub ca_services_coaching:        f64,
  /// Compétitions, séminaires, team building.
  pub ca_evenements:               f64,
  /// Merchandising, compléments, boissons et snacks.
  pub ca_boutique:                 f64,
  /// Séances unitaires, frais d'inscription, sous-location, partenariats,
  /// sponsoring.
  pub ca_autres:                   f64,
  pub ca_recurrent:                f64,
  pub ca_non_recurrent:            f64,
  pub ca_total:                    f64,
  pub pourcent_recurrent:          f64,
}

/// Annual charges by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charges {
  /// `(loyer mensuel HT + charges locatives) × 12 + taxe foncière`.
  pub loyer_annuel_total:       f64,
  /// Électricité, eau, gaz.
  pub energies_total:           f64,
  /// Salaires bruts, charges sociales, freelances, avantages, formation.
  pub masse_salariale_total:    f64,
  pub marketing_total:          f64,
  pub assurances_total:         f64,
  pub entretien_total:          f64,
  /// Comptabilité, logiciels, frais bancaires.
  pub services_exterieurs_total: f64,
  pub frais_financiers_total:   f64,
  pub amortissements:           f64,
  pub provisions:               f64,
  pub charges_total:            f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resultat {
  /// Operating result before amortisation, provisions and financial costs.
  pub ebitda:       f64,
  pub marge_ebitda: f64,
  pub resultat_net: f64,
  pub marge_nette:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ratios {
  pub loyer_ca_ratio:     f64,
  pub ms_ca_ratio:        f64,
  pub marketing_ca_ratio: f64,
  pub charges_ca_ratio:   f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tresorerie {
  pub tresorerie_actuelle: f64,
  pub creances_clients:    f64,
  pub dettes_fournisseurs: f64,
  /// `dettes fournisseurs − créances clients`.
  pub bfr_estime:          f64,
  /// Days of operating charges covered by available cash.
  pub jours_tresorerie:    f64,
  pub ratio_liquidite:     f64,
  pub total_dettes:        f64,
  /// Debt over estimated equity (30% of annual revenue), in percent.
  pub ratio_endettement:   f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceData {
  pub revenus:    Revenus,
  pub charges:    Charges,
  pub resultat:   Resultat,
  pub ratios:     Ratios,
  pub tresorerie: Tresorerie,
}

pub fn extract_finance_data(answers: &[Answer]) -> FinanceData {
  let set = AnswerSet::new(answers);
  let b = "produits_exploitation";

  let ca_abonnements_mensuels = set.num(b, "ca_abonnements_mensuels");
  let ca_abonnements_trimestriels = set.num(b, "ca_abonnements_trimestriels");
  let ca_abonnements_semestriels = set.num(b, "ca_abonnements_semestriels");
  let ca_abonnements_annuels = set.num(b, "ca_abonnements_annuels");

  let ca_cartes = set.num(b, "ca_cartes_10") + set.num(b, "ca_cartes_20");
  let ca_services_coaching = set.num(b, "ca_personal_training")
    + set.num(b, "ca_coaching_nutrition")
    + set.num(b, "ca_suivi_remote")
    + set.num(b, "ca_cours_specialises");
  let ca_evenements = set.num(b, "ca_competitions_internes")
    + set.num(b, "ca_competitions_externes")
    + set.num(b, "ca_seminaires")
    + set.num(b, "ca_team_building");
  let ca_boutique = set.num(b, "ca_merchandising_vetements")
    + set.num(b, "ca_merchandising_accessoires")
    + set.num(b, "ca_merchandising")
    + set.num(b, "ca_complements")
    + set.num(b, "ca_boissons_snacks");
  let ca_autres = set.num(b, "ca_seances_unitaires")
    + set.num(b, "ca_frais_inscription")
    + set.num(b, "ca_sous_location")
    + set.num(b, "ca_partenariats")
    + set.num(b, "ca_sponsoring");

  let ca_recurrent = ca_abonnements_mensuels
    + ca_abonnements_trimestriels
    + ca_abonnements_semestriels
    + ca_abonnements_annuels;
  let ca_non_recurrent =
    ca_cartes + ca_services_coaching + ca_evenements + ca_boutique + ca_autres;
  let ca_total = ca_recurrent + ca_non_recurrent;
  let pourcent_recurrent = pct(ca_recurrent, ca_total);

  let revenus = Revenus {
    ca_abonnements_mensuels,
    ca_abonnements_trimestriels,
    ca_abonnements_semestriels,
    ca_abonnements_annuels,
    ca_cartes,
    ca_services_coaching,
    ca_evenements,
    ca_boutique,
    ca_autres,
    ca_recurrent,
    ca_non_recurrent,
    ca_total,
    pourcent_recurrent,
  };

  let c = "charges_exploitation";

  let loyer_annuel_total = (set.num(c, "loyer_mensuel_ht")
    + set.num(c, "charges_locatives_mensuelles"))
    * 12.0
    + set.num(c, "taxe_fonciere");

  let energies_total = set.num(c, "electricite_annuel")
    + set.num(c, "eau_annuel")
    + set.num(c, "gaz_chauffage_annuel");

  let masse_salariale_total = set.num(c, "salaires_bruts_gerant")
    + set.num(c, "salaires_bruts_coachs")
    + set.num(c, "salaires_bruts_administratif")
    + set.num(c, "charges_sociales_patronales")
    + set.num(c, "cotisations_sociales_tns")
    + set.num(c, "charges_freelance")
    + set.num(c, "participation_transport")
    + set.num(c, "tickets_restaurant")
    + set.num(c, "formation_personnel")
    + set.num(c, "autres_charges_personnel");

  let marketing_total = set.num(c, "marketing_total");
  let assurances_total = set.num(c, "assurances_annuel");
  let entretien_total = set.num(c, "entretien_materiel_annuel");
  let services_exterieurs_total = set.num(c, "services_exterieurs_annuel");
  let frais_financiers_total = set.num(c, "frais_financiers_annuel");
  let amortissements = set.num(c, "dotations_amortissements");
  let provisions = set.num(c, "provisions_annuelles");

  let charges_total = loyer_annuel_total
    + energies_total
    + masse_salariale_total
    + marketing_total
    + assurances_total
    + entretien_total
    + services_exterieurs_total
    + frais_financiers_total
    + amortissements
    + provisions;

  let charges = Charges {
    loyer_annuel_total,
    energies_total,
    masse_salariale_total,
    marketing_total,
    assurances_total,
    entretien_total,
    services_exterieurs_total,
    frais_financiers_total,
    amortissements,
    provisions,
    charges_total,
  };

  let ebitda = ca_total
    - (charges_total - amortissements - provisions - frais_financiers_total);
  let resultat_net = ca_total - charges_total;

  let resultat = Resultat {
    ebitda,
    marge_ebitda: pct(ebitda, ca_total),
    resultat_net,
    marge_nette: pct(resultat_net, ca_total),
  };

  let ratios = Ratios {
    loyer_ca_ratio:     pct(loyer_annuel_total, ca_total),
    ms_ca_ratio:        pct(masse_salariale_total, ca_total),
    marketing_ca_ratio: pct(marketing_total, ca_total),
    charges_ca_ratio:   pct(charges_total, ca_total),
  };

  let t = "resultat_tresorerie";

  let tresorerie_actuelle = set.num(t, "tresorerie_actuelle");
  let creances_clients = set.num(t, "creances_clients");
  let dettes_fournisseurs = set.num(t, "dettes_fournisseurs");
  let echeance_mensuelle_emprunts = set.num(t, "echeance_mensuelle_emprunts");

  let charges_mensuelles = charges_total / 12.0;
  let passif_court_terme =
    dettes_fournisseurs + echeance_mensuelle_emprunts * 12.0;
  let total_dettes = set.num(t, "emprunts_capital_restant")
    + dettes_fournisseurs
    + set.num(t, "dettes_sociales_urssaf")
    + set.num(t, "dettes_fiscales")
    + set.num(t, "autres_dettes");
  // Equity is rarely answered; estimate it at 30% of annual revenue.
  let fonds_propres = ca_total * 0.3;

  let tresorerie = Tresorerie {
    tresorerie_actuelle,
    creances_clients,
    dettes_fournisseurs,
    bfr_estime: dettes_fournisseurs - creances_clients,
    jours_tresorerie: ratio(tresorerie_actuelle, charges_mensuelles) * 30.0,
    ratio_liquidite: ratio(
      tresorerie_actuelle + creances_clients,
      passif_court_terme,
    ),
    total_dettes,
    ratio_endettement: pct(total_dettes, fonds_propres),
  };

  FinanceData { revenus, charges, resultat, ratios, tresorerie }
}

// ─── Membres ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembresData {
  pub nb_membres_actifs_total:    f64,
  pub nb_membres_illimite:        f64,
  pub nb_membres_sans_engagement: f64,
  /// Average revenue per member per month.
  pub arpm:                       f64,
  pub anciennete_moyenne_mois:    f64,
  /// `ARPM × average tenure in months`.
  pub ltv_estime:                 f64,
}

pub fn extract_membres_data(
  answers: &[Answer],
  finance: &FinanceData,
) -> MembresData {
  let set = AnswerSet::new(answers);

  let nb_membres_actifs_total = set.num("structure_base", "nb_membres_actifs_total");
  let nb_membres_illimite = set.num("structure_base", "nb_membres_illimite");
  let nb_membres_sans_engagement =
    set.num("structure_base", "nb_membres_sans_engagement");

  let arpm = ratio(
    finance.revenus.ca_total / 12.0,
    nb_membres_actifs_total,
  );

  // Sector default when the tenure question is unanswered.
  let anciennete_moyenne_mois =
    set.num_or("retention_churn", "anciennes_moyens_mois", 22.0);

  MembresData {
    nb_membres_actifs_total,
    nb_membres_illimite,
    nb_membres_sans_engagement,
    arpm,
    anciennete_moyenne_mois,
    ltv_estime: arpm * anciennete_moyenne_mois,
  }
}

// ─── Operations ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationsData {
  pub surface_totale:               f64,
  pub surface_crossfit:             f64,
  pub ca_par_m2:                    f64,
  pub nb_creneaux_semaine:          f64,
  pub capacite_max_cours:           f64,
  pub participants_moyen_cours:     f64,
  pub taux_occupation_global_pct:   f64,
  pub essais_gratuits_mois:         f64,
  pub conversions_essai_abonne_mois: f64,
  pub taux_conversion_pct:          f64,
  pub resiliations_mensuelles:      f64,
  pub taux_churn_pct:               f64,
}

pub fn extract_operations_data(
  answers: &[Answer],
  finance: &FinanceData,
  membres: &MembresData,
) -> OperationsData {
  let set = AnswerSet::new(answers);

  // Surface defaults to 1 m² so revenue density never divides by zero,
  // while an empty audit still reports ca_par_m2 = 0.
  let surface_totale =
    set.num_or("infrastructure_detaillee", "surface_totale", 1.0);
  let surface_crossfit = set.num("infrastructure_detaillee", "surface_crossfit");
  let ca_par_m2 = ratio(finance.revenus.ca_total, surface_totale);

  let nb_creneaux_semaine = set.first_num(
    "structure_planning",
    &["creneaux_semaine", "nb_creneaux_semaine"],
  );

  let capacite_max_cours = set.num("capacite_occupation", "capacite_max_cours");
  let participants_moyen_cours =
    set.num("capacite_occupation", "participants_moyen_cours");

  // A directly-answered global rate wins; otherwise derive it from the
  // average class fill.
  let mut taux_occupation_global_pct =
    set.num("capacite_occupation", "taux_occupation_global_pct");
  if taux_occupation_global_pct == 0.0 && capacite_max_cours > 0.0 {
    taux_occupation_global_pct =
      participants_moyen_cours / capacite_max_cours * 100.0;
  }

  let essais_gratuits_mois = set.first_num(
    "acquisition_conversion",
    &["essais_gratuits_mois", "nb_essais_mois_actuel"],
  );
  let conversions_essai_abonne_mois = set.first_num(
    "acquisition_conversion",
    &["conversions_essai_abonne_mois", "nb_conversions_mois_actuel"],
  );
  let taux_conversion_pct =
    pct(conversions_essai_abonne_mois, essais_gratuits_mois);

  let resiliations_mensuelles = set.first_num(
    "retention_churn",
    &[
      "resiliations_mensuelles",
      "nb_resiliations_mois",
      "nb_resiliations_mois_actuel",
    ],
  );
  let taux_churn_pct =
    pct(resiliations_mensuelles, membres.nb_membres_actifs_total);

  OperationsData {
    surface_totale,
    surface_crossfit,
    ca_par_m2,
    nb_creneaux_semaine,
    capacite_max_cours,
    participants_moyen_cours,
    taux_occupation_global_pct,
    essais_gratuits_mois,
    conversions_essai_abonne_mois,
    taux_conversion_pct,
    resiliations_mensuelles,
    taux_churn_pct,
  }
}

// ─── RH ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RhData {
  pub effectif_total:               f64,
  pub nombre_coaches:               f64,
  pub masse_salariale_annuelle:     f64,
  pub ratio_masse_salariale_ca_pct: f64,
  pub coaches_cf_l1:                f64,
  pub coaches_cf_l2:                f64,
  pub coaches_cf_l3:                f64,
  pub coaches_cf_l4:                f64,
  pub ratio_coach_certifie_pct:     f64,
  pub membres_par_coach:            f64,
  pub ca_par_coach_annuel:          f64,
  pub taux_turnover_annuel_pct:     f64,
  pub taux_retention_coaches_pct:   f64,
  /// 90 / 70 / 50 / 30 ladder on annual coach turnover.
  pub stabilite_equipe_score:       f64,
}

pub fn extract_rh_data(
  answers: &[Answer],
  finance: &FinanceData,
  membres: &MembresData,
) -> RhData {
  let set = AnswerSet::new(answers);
  let e = "structure_equipe";

  let nombre_coaches = set.num(e, "nb_coachs_total");
  let effectif_total = set.num(e, "nb_salaries_temps_plein")
    + set.num(e, "nb_salaries_temps_partiel")
    + set.num(e, "nb_auto_entrepreneurs");

  let coaches_cf_l1 = set.num("certifications", "nb_coachs_cf_l1");
  let coaches_cf_l2 = set.num("certifications", "nb_coachs_cf_l2");
  let coaches_cf_l3 = set.num("certifications", "nb_coachs_cf_l3");
  let coaches_cf_l4 = set.num("certifications", "nb_coachs_cf_l4");
  let ratio_coach_certifie_pct = pct(
    coaches_cf_l1 + coaches_cf_l2 + coaches_cf_l3 + coaches_cf_l4,
    nombre_coaches,
  );

  let departs = set.num("turnover_stabilite", "nb_departs_coachs_12m");
  let taux_turnover_annuel_pct = pct(departs, nombre_coaches);
  let stabilite_equipe_score = if taux_turnover_annuel_pct <= 10.0 {
    90.0
  } else if taux_turnover_annuel_pct <= 20.0 {
    70.0
  } else if taux_turnover_annuel_pct <= 30.0 {
    50.0
  } else {
    30.0
  };

  RhData {
    effectif_total,
    nombre_coaches,
    masse_salariale_annuelle: finance.charges.masse_salariale_total,
    ratio_masse_salariale_ca_pct: finance.ratios.ms_ca_ratio,
    coaches_cf_l1,
    coaches_cf_l2,
    coaches_cf_l3,
    coaches_cf_l4,
    ratio_coach_certifie_pct,
    membres_par_coach: ratio(membres.nb_membres_actifs_total, nombre_coaches),
    ca_par_coach_annuel: ratio(finance.revenus.ca_total, nombre_coaches),
    taux_turnover_annuel_pct,
    taux_retention_coaches_pct: 100.0 - taux_turnover_annuel_pct,
    stabilite_equipe_score,
  }
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedData {
  pub finance:    FinanceData,
  pub membres:    MembresData,
  pub operations: OperationsData,
  pub rh:         RhData,
}

/// Extract all aggregates from one audit's answer snapshot. The sections
/// chain: membres depends on finance, operations on both, RH on both.
pub fn extract_all(answers: &[Answer]) -> ExtractedData {
  let finance = extract_finance_data(answers);
  let membres = extract_membres_data(answers, &finance);
  let operations = extract_operations_data(answers, &finance, &membres);
  let rh = extract_rh_data(answers, &finance, &membres);

  ExtractedData { finance, membres, operations, rh }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
