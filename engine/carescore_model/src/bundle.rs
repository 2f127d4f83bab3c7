//! JSON model bundles: a model definition plus its training feature order
//!
//! An artifact is either a bundle object
//!
//! ```json
//! {"feature_names": ["AGE", "GENDER"], "model": {"kind": "logistic_regression", "coefficients": [0.03, 0.2], "intercept": -3.1}}
//! ```
//!
//! or a bare model object (`{"kind": ..., ...}`), in which case no feature
//! order is declared and rows follow the feature map's own order.

use crate::backend::{ModelError, ScoreOutput, Scorer};
use crate::backends::{LinearBackend, LinearLink, LinearModel, TreeEnsemble};
use crate::features::FeatureMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::read_to_string;
use std::path::Path;

/// Serialized model definition, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression(LinearModel),
    LinearSvm(LinearModel),
    LinearRegression(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelSpec {
    /// Validate the definition and turn it into a scorer
    pub fn build(self) -> Result<Box<dyn Scorer>, ModelError> {
        let scorer: Box<dyn Scorer> = match self {
            ModelSpec::LogisticRegression(m) => Box::new(LinearBackend::new(m, LinearLink::Logistic)?),
            ModelSpec::LinearSvm(m) => Box::new(LinearBackend::new(m, LinearLink::Margin)?),
            ModelSpec::LinearRegression(m) => Box::new(LinearBackend::new(m, LinearLink::Identity)?),
            ModelSpec::TreeEnsemble(e) => {
                e.validate()?;
                Box::new(e)
            }
        };
        Ok(scorer)
    }
}

#[derive(Deserialize)]
struct BundleDocument {
    model: ModelSpec,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

/// A loaded scorer together with the feature order it expects
pub struct ModelBundle {
    scorer: Box<dyn Scorer>,
    feature_names: Option<Vec<String>>,
}

impl ModelBundle {
    pub fn new(scorer: Box<dyn Scorer>, feature_names: Option<Vec<String>>) -> Self {
        Self {
            scorer,
            feature_names,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ModelError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ModelError::InvalidModel(
                "model artifact must be a JSON object".into(),
            ));
        }
        let document = if value.get("model").is_some() {
            serde_json::from_value::<BundleDocument>(value)?
        } else {
            BundleDocument {
                model: serde_json::from_value(value)?,
                feature_names: None,
            }
        };
        let scorer = document.model.build()?;
        Ok(Self::new(scorer, document.feature_names))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::from_json_str(&text)?;
        log::debug!(
            "loaded {} model from {} ({} declared features)",
            bundle.kind(),
            path.display(),
            bundle.feature_names.as_ref().map_or(0, Vec::len)
        );
        Ok(bundle)
    }

    pub fn kind(&self) -> &str {
        self.scorer.kind()
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Lay `features` out in the declared order, or in the map's own order
    /// when the bundle declares none
    pub fn ordered_row(&self, features: &FeatureMap) -> Vec<f64> {
        match &self.feature_names {
            Some(names) if !names.is_empty() => features.row_for(names),
            _ => features.to_row(),
        }
    }

    pub fn score(&self, features: &FeatureMap) -> Result<ScoreOutput, ModelError> {
        self.scorer.score(&self.ordered_row(features))
    }
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("kind", &self.scorer.kind())
            .field("feature_names", &self.feature_names)
            .finish()
    }
}
