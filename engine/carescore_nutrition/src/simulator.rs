use crate::input::{InterventionPlan, NutritionPatient};
use crate::result::{NutritionKey, NutritionSimulation, NutritionSource};
use crate::rules;
use carescore_store::{ArtifactSnapshot, ArtifactStore};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const EMPTY_PLAN_WARNING: &str =
    "No intervention values were provided; the simulation result is empty.";

/// Run every rule block against one snapshot
pub fn simulate_with(
    snapshot: &ArtifactSnapshot,
    patient: &NutritionPatient,
    plan: &InterventionPlan,
) -> NutritionSimulation {
    let gl = &snapshot.guidelines;
    let mut results = BTreeMap::new();

    let albumin = snapshot
        .albumin
        .as_ref()
        .and_then(|bundle| rules::albumin(patient, plan, bundle));
    let source = if albumin.is_some() {
        NutritionSource::MlRule
    } else {
        NutritionSource::RuleBased
    };

    let blocks = [
        (NutritionKey::Albumin, albumin),
        (NutritionKey::Hemoglobin, rules::iron(patient, plan, &gl.iron)),
        (NutritionKey::VitaminD, rules::vitamin_d(patient, plan, &gl.vitamin_d)),
        (NutritionKey::FractureRisk, rules::calcium(patient, plan, &gl.calcium)),
        (NutritionKey::CvdRisk, rules::omega3(patient, plan, &gl.omega3)),
        (NutritionKey::VitaminC, rules::vitamin_c(patient, plan, &gl.vitamin_c)),
    ];
    for (key, result) in blocks {
        if let Some(result) = result {
            results.insert(key, result);
        }
    }
    log::debug!(
        "nutrition simulation produced {:?}",
        results.keys().collect::<Vec<_>>()
    );

    let mut warnings = Vec::new();
    if results.is_empty() {
        warnings.push(EMPTY_PLAN_WARNING.to_string());
    }
    NutritionSimulation {
        source,
        results,
        warnings,
    }
}

/// Nutrition simulator bound to a shared artifact store
#[derive(Debug, Clone)]
pub struct NutritionSimulator {
    store: Arc<ArtifactStore>,
}

impl NutritionSimulator {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn simulate(&self, patient: &NutritionPatient, plan: &InterventionPlan) -> NutritionSimulation {
        simulate_with(&self.store.snapshot(), patient, plan)
    }
}
