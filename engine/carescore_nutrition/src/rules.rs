//! Per-nutrient rule blocks
//!
//! Each block is a pure function of the patient, the plan and its guideline
//! section, and returns `None` when the plan does not include its nutrient.

use crate::features::{albumin_features, initial_albumin, protein_intake};
use crate::input::{InterventionPlan, NutritionPatient, Sex};
use crate::result::{ModelType, NutritionResult};
use carescore_model::{ModelBundle, ModelError, ScoreOutput};
use carescore_store::{
    CalciumGuideline, IronGuideline, Omega3Guideline, VitaminCGuideline, VitaminDGuideline,
};

/// Minimum co-administered vitamin D for the calcium fracture benefit, IU/day
pub const CALCIUM_VITAMIN_D_MIN_IU: f64 = 800.0;
/// Minimum EPA+DHA dose for the cardiovascular benefit, g/day
pub const OMEGA3_MIN_G: f64 = 1.0;
/// CRP above which inflammation blunts the iron response, mg/L
pub const IRON_CRP_THRESHOLD: f64 = 5.0;

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Albumin change projected by the albumin model.
///
/// No model output means no entry; there is no formula fallback here.
pub fn albumin(
    patient: &NutritionPatient,
    plan: &InterventionPlan,
    bundle: &ModelBundle,
) -> Option<NutritionResult> {
    let features = albumin_features(patient, plan);
    let predicted = match bundle.score(&features) {
        Ok(ScoreOutput::Value(v)) | Ok(ScoreOutput::Margin(v)) => v,
        Ok(ScoreOutput::Probabilities(p)) => {
            let err = ModelError::UnusableOutput(format!(
                "albumin model returned {} class probabilities instead of a change",
                p.len()
            ));
            log::warn!("albumin projection skipped: {err}");
            return None;
        }
        Err(err) => {
            log::warn!("albumin projection skipped: {err}");
            return None;
        }
    };

    let current = initial_albumin(patient);
    let protein = protein_intake(plan);
    let duration_factor = (plan.weeks() / 4.0).clamp(0.25, 2.0);
    let change = predicted * duration_factor;

    let mut result = NutritionResult::new(
        "Albumin",
        format!(
            "ML prediction: protein {protein}g/day for {} weeks",
            plan.duration_weeks
        ),
    )
    .with_values(Some(current), Some(current + change), Some(change))
    .with_monitoring(["Recheck albumin after 4 weeks", "Renal function monitoring"]);
    result.model_type = ModelType::Ml;
    if patient.advanced_ckd() {
        result
            .warnings
            .push("CKD: caution with high protein intake".to_string());
    }
    Some(result)
}

pub fn iron(
    patient: &NutritionPatient,
    plan: &InterventionPlan,
    gl: &IronGuideline,
) -> Option<NutritionResult> {
    let dose = plan.iron()?;
    let mut factor = 1.0;
    let mut warnings = Vec::new();
    if patient.advanced_ckd() {
        factor *= gl.ckd_absorption_factor;
        warnings.push(format!(
            "CKD: iron absorption reduced by {}",
            percent(1.0 - gl.ckd_absorption_factor)
        ));
    }
    let inflamed = patient.chronic_inflammation
        || patient.crp.is_some_and(|crp| crp > IRON_CRP_THRESHOLD);
    if inflamed {
        factor *= gl.inflammation_factor;
        warnings.push("Inflammation: reduced response to iron".to_string());
    }

    let change = gl.baseline_hgb_increase * factor * (dose / 100.0) * (plan.weeks() / 4.0);
    let mut result = NutritionResult::new(
        "Hemoglobin",
        format!(
            "Iron {dose}mg/day for {} weeks -> Hgb +{change:.1} g/dL",
            plan.duration_weeks
        ),
    )
    .with_values(
        patient.hemoglobin,
        patient.hemoglobin.map(|hgb| hgb + change),
        Some(change),
    )
    .with_monitoring(["CBC after 4 weeks", "Track ferritin/TSAT"]);
    result.warnings = warnings;
    Some(result)
}

pub fn vitamin_d(
    patient: &NutritionPatient,
    plan: &InterventionPlan,
    gl: &VitaminDGuideline,
) -> Option<NutritionResult> {
    let dose = plan.vitamin_d()?;
    // serum 25(OH)D plateaus after about 12 weeks
    let time_factor = (plan.weeks() / 12.0).min(1.0);
    let increase = (dose / 1000.0) * gl.increase_per_1000iu * time_factor;

    let mut result = NutritionResult::new(
        "Vitamin D",
        format!(
            "Vitamin D {dose} IU/day for {} weeks -> +{increase:.1} ng/mL",
            plan.duration_weeks
        ),
    )
    .with_values(
        patient.vitamin_d,
        patient.vitamin_d.map(|level| level + increase),
        Some(increase),
    )
    .with_monitoring(["25(OH)D after 3 months", "Calcium monitoring"]);
    if dose > gl.upper_limit_iu {
        result.warnings.push(format!(
            "Exceeds upper limit: {dose} > {} IU/day",
            gl.upper_limit_iu
        ));
    }
    Some(result)
}

/// Fracture risk under calcium, which only helps alongside vitamin D
pub fn calcium(
    patient: &NutritionPatient,
    plan: &InterventionPlan,
    gl: &CalciumGuideline,
) -> Option<NutritionResult> {
    let dose = plan.calcium()?;
    let baseline = if patient.fracture_risk_high { 0.20 } else { 0.10 };
    let with_vitamin_d = plan
        .vitamin_d()
        .filter(|iu| *iu >= CALCIUM_VITAMIN_D_MIN_IU);
    let reduction = if with_vitamin_d.is_some() {
        gl.fracture_risk_reduction
    } else {
        0.0
    };
    let expected = baseline * (1.0 - reduction);
    let interpretation = match with_vitamin_d {
        Some(iu) => format!(
            "Calcium {dose}mg + vitamin D {iu} IU -> fracture risk -{}",
            percent(gl.fracture_risk_reduction)
        ),
        None => format!(
            "Calcium {dose}mg (co-administer vitamin D {CALCIUM_VITAMIN_D_MIN_IU} IU/day or more)"
        ),
    };

    let mut result = NutritionResult::new("Fracture Risk", interpretation)
        .with_values(Some(baseline), Some(expected), Some(-(baseline - expected)))
        .with_monitoring(["DEXA bone density", "Fall risk assessment"]);
    if patient.hypercalcemia {
        result
            .contraindications
            .push("Hypercalcemia: calcium supplementation contraindicated".to_string());
    }
    Some(result)
}

pub fn omega3(
    patient: &NutritionPatient,
    plan: &InterventionPlan,
    gl: &Omega3Guideline,
) -> Option<NutritionResult> {
    let dose = plan.omega3()?;
    let baseline = if patient.age >= 70.0 { 0.15 } else { 0.10 };
    let effective = dose >= OMEGA3_MIN_G;
    let reduction = if effective { gl.cvd_risk_reduction } else { 0.0 };
    let expected = baseline * (1.0 - reduction);
    let interpretation = if effective {
        format!(
            "Omega-3 {dose}g/day -> CVD risk -{}",
            percent(gl.cvd_risk_reduction)
        )
    } else {
        format!("Omega-3 {dose}g/day ({OMEGA3_MIN_G:.1}g/day or more recommended)")
    };

    Some(
        NutritionResult::new("CVD Risk", interpretation)
            .with_values(Some(baseline), Some(expected), Some(-(baseline - expected)))
            .with_monitoring(["Lipid profile", "Bleeding tendency (if on anticoagulants)"]),
    )
}

/// Dose band against the reference values, plus patient-specific cautions
pub fn vitamin_c(
    patient: &NutritionPatient,
    plan: &InterventionPlan,
    gl: &VitaminCGuideline,
) -> Option<NutritionResult> {
    let dose = plan.vitamin_c()?;
    let [optimal_low, optimal_high] = gl.optimal_range;
    let mut warnings = Vec::new();
    let mut contraindications = Vec::new();
    let mut monitoring = Vec::new();

    let band = if dose < gl.rni {
        "below recommended intake (deficiency risk)"
    } else if dose < optimal_low {
        "meets recommended intake"
    } else if dose <= optimal_high {
        "optimal range (antioxidant, immune support)"
    } else if dose <= gl.upper_limit {
        warnings.push("Split doses recommended above 1000mg".to_string());
        "high dose but within safe range"
    } else {
        warnings.push(format!("Exceeds upper limit of {}mg", gl.upper_limit));
        "exceeds upper limit (diarrhea, GI discomfort)"
    };

    if patient.smoker && dose < 150.0 {
        warnings.push("Smoker: +50-100mg recommended (150-200mg/day)".to_string());
    }
    if patient.immune_compromised && dose < 200.0 {
        warnings.push("Immunocompromised: 200-500mg/day recommended".to_string());
    }
    let stone_threshold = gl.kidney_stone_risk_threshold_male;
    if patient.sex == Sex::Male && dose >= stone_threshold {
        if patient.kidney_stone_history {
            contraindications.push(format!(
                "Male with kidney stone history: {stone_threshold}mg or more contraindicated (risk doubled)"
            ));
        } else {
            warnings.push(format!(
                "Male at {stone_threshold}mg or more: increased kidney stone risk"
            ));
        }
    }
    if patient.hemochromatosis {
        contraindications.push("Hemochromatosis: vitamin C increases iron absorption".to_string());
    }
    if patient.ferritin.is_some_and(|ferritin| ferritin < 30.0) {
        monitoring.push(
            "Iron deficiency: vitamin C taken with iron raises absorption by 67%".to_string(),
        );
    }

    let mut result = NutritionResult::new("Vitamin C Status", format!("{dose}mg/day - {band}"));
    result.warnings = warnings;
    result.contraindications = contraindications;
    result.monitoring_recommendations = monitoring;
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> InterventionPlan {
        InterventionPlan::default()
    }

    #[test]
    fn iron_reference_case() {
        let plan = InterventionPlan {
            iron_mg: Some(100.0),
            ..plan()
        };
        let result = iron(&NutritionPatient::new(70.0), &plan, &IronGuideline::default()).unwrap();
        assert_eq!(result.expected_change, Some(1.0));
        assert_eq!(result.expected_value, None);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn iron_factors_compound() {
        let mut patient = NutritionPatient::new(70.0);
        patient.ckd_stage = 3;
        patient.crp = Some(12.0);
        patient.hemoglobin = Some(9.5);
        let plan = InterventionPlan {
            iron_mg: Some(200.0),
            duration_weeks: 8,
            ..plan()
        };
        let result = iron(&patient, &plan, &IronGuideline::default()).unwrap();
        let change = 1.0 * 0.7 * 0.7 * 2.0 * 2.0;
        assert!((result.expected_change.unwrap() - change).abs() < 1e-12);
        assert!((result.expected_value.unwrap() - (9.5 + change)).abs() < 1e-12);
        assert_eq!(
            result.warnings,
            vec![
                "CKD: iron absorption reduced by 30%",
                "Inflammation: reduced response to iron"
            ]
        );
    }

    #[test]
    fn vitamin_d_time_factor_caps_at_twelve_weeks() {
        let patient = NutritionPatient {
            vitamin_d: Some(18.0),
            ..NutritionPatient::new(80.0)
        };
        let six = InterventionPlan {
            vitamin_d_iu: Some(2000.0),
            duration_weeks: 6,
            ..plan()
        };
        let twenty_four = InterventionPlan {
            duration_weeks: 24,
            ..six.clone()
        };
        let gl = VitaminDGuideline::default();
        assert_eq!(vitamin_d(&patient, &six, &gl).unwrap().expected_change, Some(7.0));
        let long = vitamin_d(&patient, &twenty_four, &gl).unwrap();
        assert_eq!(long.expected_change, Some(14.0));
        assert_eq!(long.expected_value, Some(32.0));
        assert!(long.warnings.is_empty());
    }

    #[test]
    fn vitamin_d_above_upper_limit_warns() {
        let plan = InterventionPlan {
            vitamin_d_iu: Some(5000.0),
            ..plan()
        };
        let result =
            vitamin_d(&NutritionPatient::new(75.0), &plan, &VitaminDGuideline::default()).unwrap();
        assert_eq!(result.warnings, vec!["Exceeds upper limit: 5000 > 4000 IU/day"]);
    }

    #[test]
    fn calcium_without_vitamin_d_has_no_reduction() {
        let plan = InterventionPlan {
            calcium_mg: Some(1000.0),
            vitamin_d_iu: Some(400.0),
            ..plan()
        };
        let result =
            calcium(&NutritionPatient::new(80.0), &plan, &CalciumGuideline::default()).unwrap();
        assert_eq!(result.current_value, Some(0.10));
        assert_eq!(result.expected_value, Some(0.10));
        assert_eq!(result.expected_change, Some(0.0));
        assert!(result.interpretation.contains("co-administer vitamin D"));
    }

    #[test]
    fn calcium_with_vitamin_d_for_high_risk_patient() {
        let patient = NutritionPatient {
            fracture_risk_high: true,
            hypercalcemia: true,
            ..NutritionPatient::new(80.0)
        };
        let plan = InterventionPlan {
            calcium_mg: Some(1200.0),
            vitamin_d_iu: Some(800.0),
            ..plan()
        };
        let result = calcium(&patient, &plan, &CalciumGuideline::default()).unwrap();
        assert!((result.expected_value.unwrap() - 0.17).abs() < 1e-12);
        assert!((result.expected_change.unwrap() + 0.03).abs() < 1e-12);
        assert!(result.interpretation.ends_with("fracture risk -15%"));
        assert_eq!(result.contraindications.len(), 1);
    }

    #[test]
    fn omega3_threshold() {
        let gl = Omega3Guideline::default();
        let low = InterventionPlan {
            omega3_epa_dha_g: Some(0.5),
            ..plan()
        };
        let result = omega3(&NutritionPatient::new(72.0), &low, &gl).unwrap();
        assert_eq!(result.current_value, Some(0.15));
        assert_eq!(result.expected_change, Some(0.0));
        assert!(result.interpretation.contains("1.0g/day or more recommended"));

        let high = InterventionPlan {
            omega3_epa_dha_g: Some(2.0),
            ..plan()
        };
        let result = omega3(&NutritionPatient::new(60.0), &high, &gl).unwrap();
        assert!((result.expected_value.unwrap() - 0.092).abs() < 1e-12);
        assert!(result.interpretation.ends_with("CVD risk -8%"));
    }

    #[test]
    fn vitamin_c_bands() {
        let gl = VitaminCGuideline::default();
        let patient = NutritionPatient::new(70.0);
        let band = |dose: f64| {
            let plan = InterventionPlan {
                vitamin_c_mg: Some(dose),
                ..plan()
            };
            vitamin_c(&patient, &plan, &gl).unwrap().interpretation
        };
        assert!(band(50.0).contains("below recommended intake"));
        assert!(band(100.0).contains("meets recommended intake"));
        assert!(band(200.0).contains("optimal range"));
        assert!(band(500.0).contains("optimal range"));
        assert!(band(501.0).contains("within safe range"));
        assert!(band(2000.0).contains("within safe range"));
        assert!(band(2001.0).contains("exceeds upper limit"));
    }

    #[test]
    fn vitamin_c_kidney_stone_history_is_a_contraindication() {
        let patient = NutritionPatient {
            sex: Sex::Male,
            kidney_stone_history: true,
            ..NutritionPatient::new(70.0)
        };
        let plan = InterventionPlan {
            vitamin_c_mg: Some(1200.0),
            ..plan()
        };
        let result = vitamin_c(&patient, &plan, &VitaminCGuideline::default()).unwrap();
        assert_eq!(result.contraindications.len(), 1);
        assert!(result.contraindications[0].contains("kidney stone history"));
        assert!(!result.warnings.iter().any(|w| w.contains("kidney stone")));
    }

    #[test]
    fn vitamin_c_patient_cautions() {
        let patient = NutritionPatient {
            smoker: true,
            immune_compromised: true,
            hemochromatosis: true,
            ferritin: Some(12.0),
            ..NutritionPatient::new(70.0)
        };
        let plan = InterventionPlan {
            vitamin_c_mg: Some(120.0),
            ..plan()
        };
        let result = vitamin_c(&patient, &plan, &VitaminCGuideline::default()).unwrap();
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(
            result.contraindications,
            vec!["Hemochromatosis: vitamin C increases iron absorption"]
        );
        assert_eq!(result.monitoring_recommendations.len(), 1);
    }

    #[test]
    fn blocks_skip_absent_doses() {
        let patient = NutritionPatient::new(70.0);
        assert!(iron(&patient, &plan(), &IronGuideline::default()).is_none());
        assert!(vitamin_d(&patient, &plan(), &VitaminDGuideline::default()).is_none());
        assert!(calcium(&patient, &plan(), &CalciumGuideline::default()).is_none());
        assert!(omega3(&patient, &plan(), &Omega3Guideline::default()).is_none());
        assert!(vitamin_c(&patient, &plan(), &VitaminCGuideline::default()).is_none());
    }
}
