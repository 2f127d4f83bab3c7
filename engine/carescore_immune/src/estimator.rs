//! Risk probability estimation strategies

use crate::features::{
    AGE, ANTIPSYCHOTIC, DISEASE_BURDEN, FRAILTY_INDEX, IMMUNOSUP, SEVERE_IMMUNE_LOW, STEROID,
};
use carescore_model::{sigmoid, FeatureMap, ModelBundle, ModelError, ScoreOutput};
use serde::{Deserialize, Serialize};

/// Which path produced a probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Model,
    Fallback,
}

/// Turns engineered immune features into an infection-risk probability
pub trait RiskEstimator {
    fn estimate(&self, features: &FeatureMap) -> Result<f64, ModelError>;
    fn source(&self) -> Source;
}

/// Estimates through a loaded model bundle
#[derive(Debug, Clone, Copy)]
pub struct ModelEstimator<'a> {
    bundle: &'a ModelBundle,
}

impl<'a> ModelEstimator<'a> {
    pub fn new(bundle: &'a ModelBundle) -> Self {
        Self { bundle }
    }
}

impl RiskEstimator for ModelEstimator<'_> {
    fn estimate(&self, features: &FeatureMap) -> Result<f64, ModelError> {
        match self.bundle.score(features)? {
            ScoreOutput::Probabilities(p) => p.get(1).copied().ok_or_else(|| {
                ModelError::UnusableOutput(format!(
                    "expected a positive-class probability, got {} classes",
                    p.len()
                ))
            }),
            ScoreOutput::Margin(m) => Ok(sigmoid(m)),
            ScoreOutput::Value(v) => Ok(v.clamp(0.0, 1.0)),
        }
    }

    fn source(&self) -> Source {
        Source::Model
    }
}

/// Fixed linear formula used when no model is loaded or the model fails
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaEstimator;

impl FormulaEstimator {
    pub const MIN: f64 = 0.05;
    pub const MAX: f64 = 0.95;

    pub fn probability(&self, features: &FeatureMap) -> f64 {
        let age = features.value(AGE);
        let risk = 0.12
            + (age - 65.0).max(0.0) * 0.007
            + features.value(DISEASE_BURDEN) * 0.08
            + features.value(FRAILTY_INDEX) * 0.06
            + features.value(SEVERE_IMMUNE_LOW) * 0.08
            + features.value(STEROID) * 0.04
            + features.value(IMMUNOSUP) * 0.06
            + features.value(ANTIPSYCHOTIC) * 0.02;
        risk.max(Self::MIN).min(Self::MAX)
    }
}

impl RiskEstimator for FormulaEstimator {
    fn estimate(&self, features: &FeatureMap) -> Result<f64, ModelError> {
        Ok(self.probability(features))
    }

    fn source(&self) -> Source {
        Source::Fallback
    }
}
