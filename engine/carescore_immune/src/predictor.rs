//! DIVS scoring on top of the risk estimators

use crate::estimator::{FormulaEstimator, ModelEstimator, RiskEstimator, Source};
use crate::features::{engineered_features, environment_rr, ENV_RR};
use crate::input::{ImmuneInput, ImmuneRequest};
use carescore_model::FeatureMap;
use carescore_store::{ArtifactSnapshot, ArtifactStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    High,
    Moderate,
    Low,
}

impl RiskLevel {
    /// Tier a DIVS score; each cutoff belongs to the tier above it
    pub fn from_divs(divs_score: f64) -> Self {
        if divs_score < 30.0 {
            RiskLevel::Critical
        } else if divs_score < 50.0 {
            RiskLevel::High
        } else if divs_score < 70.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmuneResult {
    pub resident_id: Option<String>,
    pub source: Source,
    pub risk_probability: f64,
    pub immunity_score: f64,
    pub divs_score: f64,
    pub risk_level: RiskLevel,
    pub used_features: FeatureMap,
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Score one input against a fixed snapshot
pub fn predict_with(
    snapshot: &ArtifactSnapshot,
    resident_id: Option<String>,
    input: &ImmuneInput,
) -> ImmuneResult {
    let features = engineered_features(input);
    let env_rr = environment_rr(input);

    let modeled = snapshot.immune.as_ref().and_then(|bundle| {
        let estimator = ModelEstimator::new(bundle);
        match estimator.estimate(&features) {
            Ok(p) => Some((estimator.source(), p)),
            Err(err) => {
                log::warn!("immune model failed, using fallback formula: {err}");
                None
            }
        }
    });
    let (source, probability) =
        modeled.unwrap_or_else(|| (FormulaEstimator.source(), FormulaEstimator.probability(&features)));

    let probability = clamp(probability, 0.0, 1.0);
    let immunity_score = clamp((1.0 - probability) * 100.0, 0.0, 100.0);
    let divs_score = clamp(immunity_score / env_rr, 0.0, 100.0);
    let risk_level = RiskLevel::from_divs(divs_score);

    let mut used_features = features;
    used_features.insert(ENV_RR, env_rr);

    ImmuneResult {
        resident_id,
        source,
        risk_probability: round_to(probability, 4),
        immunity_score: round_to(immunity_score, 2),
        divs_score: round_to(divs_score, 2),
        risk_level,
        used_features,
    }
}

/// Immune predictor bound to a shared artifact store
#[derive(Debug, Clone)]
pub struct ImmunePredictor {
    store: Arc<ArtifactStore>,
}

impl ImmunePredictor {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn predict(&self, resident_id: Option<String>, input: &ImmuneInput) -> ImmuneResult {
        predict_with(&self.store.snapshot(), resident_id, input)
    }

    /// One result per request, in order, all against the same snapshot
    pub fn predict_batch(&self, requests: &[ImmuneRequest]) -> Vec<ImmuneResult> {
        let snapshot = self.store.snapshot();
        requests
            .iter()
            .map(|req| predict_with(&snapshot, req.resident_id.clone(), &req.features))
            .collect()
    }
}
