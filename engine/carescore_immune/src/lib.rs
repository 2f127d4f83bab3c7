//! DIVS immune risk prediction for care-facility residents
//!
//! Raw demographics, comorbidity and medication flags are turned into an
//! engineered feature map, scored either by the loaded immune model or by a
//! fixed formula, and combined with an environmental risk multiplier into
//! the DIVS score.

pub mod estimator;
pub mod features;
pub mod input;
pub mod predictor;

pub use estimator::{FormulaEstimator, ModelEstimator, RiskEstimator, Source};
pub use features::{engineered_features, environment_rr};
pub use input::{Gender, ImmuneInput, ImmuneRequest};
pub use predictor::{ImmunePredictor, ImmuneResult, RiskLevel};
