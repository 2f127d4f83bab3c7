//! Engineered immune features
//!
//! The same map feeds both the trained model and the fallback formula.

use crate::input::{Gender, ImmuneInput};
use carescore_model::FeatureMap;

pub const AGE: &str = "AGE";
pub const GENDER: &str = "GENDER";
pub const DEMENTIA: &str = "DEMENTIA_YN";
pub const PARKINSON: &str = "PARKINSON_YN";
pub const CHF: &str = "CHF_YN";
pub const CKD: &str = "CKD_YN";
pub const COPD: &str = "COPD_YN";
pub const CANCER: &str = "CANCER_YN";
pub const STEROID: &str = "STEROID_YN";
pub const IMMUNOSUP: &str = "IMMUNOSUP_YN";
pub const ANTIPSYCHOTIC: &str = "ANTIPSYCHOTIC_YN";

pub const FRAILTY_INDEX: &str = "FRAILTY_INDEX";
pub const SEVERE_IMMUNE_LOW: &str = "SEVERE_IMMUNE_LOW";
pub const DISEASE_BURDEN: &str = "DISEASE_BURDEN";
pub const AGE_BIN: &str = "AGE_BIN";
pub const AGE_SQ: &str = "AGE_SQ";
pub const AGE_X_DISEASE: &str = "AGE_x_DISEASE";
pub const AGE_X_FRAILTY: &str = "AGE_x_FRAILTY";

/// Environmental multiplier, carried only in the reported feature map
pub const ENV_RR: &str = "ENV_RR";

const ENV_RR_MIN: f64 = 0.5;
const ENV_RR_MAX: f64 = 2.5;

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Age band: <65, 65-74, 75-84, 85+
pub fn age_bin(age: f64) -> f64 {
    if age < 65.0 {
        0.0
    } else if age < 75.0 {
        1.0
    } else if age < 85.0 {
        2.0
    } else {
        3.0
    }
}

/// Raw inputs cast to numbers, in model order
pub fn base_features(input: &ImmuneInput) -> FeatureMap {
    let mut map = FeatureMap::with_capacity(18);
    map.insert(AGE, input.age);
    map.insert(GENDER, indicator(input.gender == Gender::Male));
    map.insert(DEMENTIA, indicator(input.dementia_yn));
    map.insert(PARKINSON, indicator(input.parkinson_yn));
    map.insert(CHF, indicator(input.chf_yn));
    map.insert(CKD, indicator(input.ckd_yn));
    map.insert(COPD, indicator(input.copd_yn));
    map.insert(CANCER, indicator(input.cancer_yn));
    map.insert(STEROID, indicator(input.steroid_yn));
    map.insert(IMMUNOSUP, indicator(input.immunosup_yn));
    map.insert(ANTIPSYCHOTIC, indicator(input.antipsychotic_yn));
    map
}

/// Base features followed by the seven derived ones
pub fn engineered_features(input: &ImmuneInput) -> FeatureMap {
    let mut map = base_features(input);
    let age = input.age;
    let frailty = indicator(age >= 75.0 && (input.dementia_yn || input.parkinson_yn));
    let severe_immune_low = indicator(input.cancer_yn && (input.steroid_yn || input.immunosup_yn));
    let disease_burden = [input.chf_yn, input.ckd_yn, input.copd_yn, input.cancer_yn]
        .into_iter()
        .map(indicator)
        .sum::<f64>();

    map.insert(FRAILTY_INDEX, frailty);
    map.insert(SEVERE_IMMUNE_LOW, severe_immune_low);
    map.insert(DISEASE_BURDEN, disease_burden);
    map.insert(AGE_BIN, age_bin(age));
    map.insert(AGE_SQ, age * age);
    map.insert(AGE_X_DISEASE, age * disease_burden);
    map.insert(AGE_X_FRAILTY, age * frailty);
    map
}

/// Geometric mean of the six risk ratios, clamped to [0.5, 2.5]
pub fn environment_rr(input: &ImmuneInput) -> f64 {
    let ratios = input.risk_ratios();
    let product: f64 = ratios.iter().product();
    let mean = product.powf(1.0 / ratios.len() as f64);
    // NaN (a negative product) lands on the lower bound
    mean.max(ENV_RR_MIN).min(ENV_RR_MAX)
}
