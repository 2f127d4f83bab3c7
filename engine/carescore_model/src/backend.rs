//! Scorer trait, output shapes and error types for model inference

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or invoking a scorer
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model definition: {0}")]
    InvalidModel(String),
    #[error("expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },
    #[error("feature index {index} out of range for a row of {len} features")]
    FeatureIndex { index: usize, len: usize },
    #[error("model produced a non-finite score")]
    NonFinite,
    #[error("unusable model output: {0}")]
    UnusableOutput(String),
}

/// Raw output of a scorer, tagged by what kind of quantity it is.
///
/// Consumers decide how to turn each shape into the number they need:
/// class probabilities carry the positive class at index 1, a margin is an
/// unbounded decision value, and a plain value is whatever the model
/// regressed.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutput {
    Probabilities(Vec<f64>),
    Margin(f64),
    Value(f64),
}

impl ScoreOutput {
    pub(crate) fn checked(self) -> Result<Self, ModelError> {
        let finite = match &self {
            ScoreOutput::Probabilities(p) => p.iter().all(|x| x.is_finite()),
            ScoreOutput::Margin(x) | ScoreOutput::Value(x) => x.is_finite(),
        };
        if finite {
            Ok(self)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}

/// An opaque trained scoring function over an ordered feature row.
pub trait Scorer: Send + Sync {
    /// Score a single row whose values follow the model's feature order
    fn score(&self, row: &[f64]) -> Result<ScoreOutput, ModelError>;

    /// Backend identifier, e.g. `logistic_regression`
    fn kind(&self) -> &str;
}
