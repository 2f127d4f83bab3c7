//! Albumin sub-model features
//!
//! Lab values fall back to population defaults; the legacy lower-case lab
//! block and the upper-case change-model block are both emitted, along with
//! lower-case aliases of the interaction terms, so models trained against
//! either naming resolve their columns.

use crate::input::{InterventionPlan, NutritionPatient, Sex};
use carescore_model::FeatureMap;

pub const DEFAULT_ALBUMIN: f64 = 3.5;
pub const DEFAULT_PROTEIN_G: f64 = 50.0;

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Labs consumed by the albumin model with their default values
fn labs(patient: &NutritionPatient) -> [(&'static str, Option<f64>, f64); 10] {
    [
        ("hemoglobin", patient.hemoglobin, 13.0),
        ("bun", patient.bun, 20.0),
        ("creatinine", patient.creatinine, 1.0),
        ("glucose", patient.glucose, 100.0),
        ("sodium", patient.sodium, 140.0),
        ("potassium", patient.potassium, 4.0),
        ("chloride", patient.chloride, 105.0),
        ("bicarbonate", patient.bicarbonate, 24.0),
        ("wbc", patient.wbc, 8.0),
        ("platelet", patient.platelet, 250.0),
    ]
}

/// Baseline albumin, defaulted
pub fn initial_albumin(patient: &NutritionPatient) -> f64 {
    patient.albumin.unwrap_or(DEFAULT_ALBUMIN)
}

/// Daily protein, defaulted
pub fn protein_intake(plan: &InterventionPlan) -> f64 {
    plan.protein_g.unwrap_or(DEFAULT_PROTEIN_G)
}

pub fn albumin_features(patient: &NutritionPatient, plan: &InterventionPlan) -> FeatureMap {
    let age = patient.age;
    let sex_m = indicator(patient.sex == Sex::Male);
    let mut map = FeatureMap::with_capacity(42);
    map.insert("age", age);
    map.insert("sex_M", sex_m);
    for (name, value, default) in labs(patient) {
        map.insert(name, value.unwrap_or(default));
    }
    map.insert(
        "bun_creatinine_ratio",
        map.value("bun") / map.value("creatinine").max(0.1),
    );

    let ckd = indicator(patient.advanced_ckd());
    let diabetes = indicator(map.value("glucose") >= 126.0);
    let cci = ckd + diabetes;
    let albumin = initial_albumin(patient);
    let protein = protein_intake(plan);

    map.insert("AGE", age);
    map.insert("GENDER", sex_m);
    map.insert("CKD", ckd);
    map.insert("DIABETES", diabetes);
    map.insert("CCI", cci);
    map.insert("INITIAL_ALBUMIN", albumin);
    map.insert("PROTEIN_INTAKE", protein);

    // weight is not collected; approximate it from age
    let weight_proxy = age * 0.5 + 50.0;
    map.insert("protein_per_kg", protein / weight_proxy);
    map.insert("high_protein", indicator(protein > 60.0));
    map.insert("low_protein", indicator(protein < 40.0));
    map.insert("low_baseline_albumin", indicator(albumin < 3.5));
    map.insert("very_low_baseline", indicator(albumin < 3.0));
    map.insert("CKD_protein", ckd * protein);
    map.insert("DIABETES_protein", diabetes * protein);
    map.insert("baseline_protein", albumin * protein);
    map.insert("CKD_baseline", ckd * albumin);
    map.insert("elderly", indicator(age > 75.0));
    map.insert("AGE_CKD", age * ckd);
    map.insert(
        "high_risk",
        indicator(ckd == 1.0 || diabetes == 1.0 || albumin < 3.0),
    );
    map.insert("comorbidity_count", cci);
    map.insert("protein_squared", protein * protein);
    map.insert("protein_log", protein.ln_1p());
    map.insert("albumin_squared", albumin * albumin);
    map.insert("albumin_log", albumin.max(0.1).ln());

    for (alias, source) in [
        ("cci", "CCI"),
        ("ckd_protein", "CKD_protein"),
        ("diabetes_protein", "DIABETES_protein"),
        ("ckd_baseline", "CKD_baseline"),
        ("age_ckd", "AGE_CKD"),
    ] {
        map.insert(alias, map.value(source));
    }
    map
}
