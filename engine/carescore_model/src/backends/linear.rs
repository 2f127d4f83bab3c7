//! Linear models: y = W·x + b, read through one of three link functions

use crate::backend::{ModelError, ScoreOutput, Scorer};
use crate::calibration::sigmoid;
use serde::{Deserialize, Serialize};

/// Coefficients and intercept of a linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.is_empty() {
            return Err(ModelError::InvalidModel(
                "linear model has no coefficients".into(),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::InvalidModel(
                "linear model parameters must be finite".into(),
            ));
        }
        Ok(())
    }

    /// W·x + b
    pub fn decision(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.coefficients.len() {
            return Err(ModelError::FeatureCount {
                expected: self.coefficients.len(),
                got: row.len(),
            });
        }
        let dot: f64 = row
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept;
        Ok(dot)
    }
}

/// How the linear decision value is exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearLink {
    /// Two-class probabilities through the logistic function
    Logistic,
    /// Unbounded decision margin
    Margin,
    /// Regression output
    Identity,
}

#[derive(Debug, Clone)]
pub struct LinearBackend {
    model: LinearModel,
    link: LinearLink,
}

impl LinearBackend {
    pub fn new(model: LinearModel, link: LinearLink) -> Result<Self, ModelError> {
        model.validate()?;
        Ok(Self { model, link })
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }
}

impl Scorer for LinearBackend {
    fn score(&self, row: &[f64]) -> Result<ScoreOutput, ModelError> {
        let z = self.model.decision(row)?;
        let out = match self.link {
            LinearLink::Logistic => {
                let p = sigmoid(z);
                ScoreOutput::Probabilities(vec![1.0 - p, p])
            }
            LinearLink::Margin => ScoreOutput::Margin(z),
            LinearLink::Identity => ScoreOutput::Value(z),
        };
        out.checked()
    }

    fn kind(&self) -> &str {
        match self.link {
            LinearLink::Logistic => "logistic_regression",
            LinearLink::Margin => "linear_svm",
            LinearLink::Identity => "linear_regression",
        }
    }
}
