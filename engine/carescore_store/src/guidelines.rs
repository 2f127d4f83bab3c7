//! Nutrition guideline parameters
//!
//! A guideline document is merged over the built-in defaults two levels
//! deep: `{"iron": {"baseline_hgb_increase": 2.0}}` replaces that single
//! parameter and keeps the remaining iron defaults. Nutrients and
//! parameters the engine does not know are kept verbatim.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::read_to_string;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IronGuideline {
    pub baseline_hgb_increase: f64,
    pub ckd_absorption_factor: f64,
    pub inflammation_factor: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for IronGuideline {
    fn default() -> Self {
        Self {
            baseline_hgb_increase: 1.0,
            ckd_absorption_factor: 0.7,
            inflammation_factor: 0.7,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitaminDGuideline {
    pub increase_per_1000iu: f64,
    pub upper_limit_iu: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for VitaminDGuideline {
    fn default() -> Self {
        Self {
            increase_per_1000iu: 7.0,
            upper_limit_iu: 4000.0,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalciumGuideline {
    pub fracture_risk_reduction: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CalciumGuideline {
    fn default() -> Self {
        Self {
            fracture_risk_reduction: 0.15,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Omega3Guideline {
    pub cvd_risk_reduction: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Omega3Guideline {
    fn default() -> Self {
        Self {
            cvd_risk_reduction: 0.08,
            extra: Map::new(),
        }
    }
}

/// Daily vitamin C reference values, in mg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitaminCGuideline {
    pub rni: f64,
    /// Inclusive `[low, high]`
    pub optimal_range: [f64; 2],
    pub upper_limit: f64,
    pub kidney_stone_risk_threshold_male: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for VitaminCGuideline {
    fn default() -> Self {
        Self {
            rni: 100.0,
            optimal_range: [200.0, 500.0],
            upper_limit: 2000.0,
            kidney_stone_risk_threshold_male: 1000.0,
            extra: Map::new(),
        }
    }
}

/// The guideline table consulted by the nutrition rule engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guidelines {
    pub iron: IronGuideline,
    pub vitamin_d: VitaminDGuideline,
    pub calcium: CalciumGuideline,
    pub omega3: Omega3Guideline,
    pub vitamin_c: VitaminCGuideline,
    /// Nutrients without a typed section
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Guidelines {
    /// Merge a parsed guideline document over the defaults
    pub fn merged(document: Value) -> Result<Self, StoreError> {
        let Value::Object(overrides) = document else {
            return Err(StoreError::GuidelineShape);
        };
        let Value::Object(mut merged) =
            serde_json::to_value(Guidelines::default()).map_err(StoreError::GuidelineValue)?
        else {
            return Err(StoreError::GuidelineShape);
        };

        for (nutrient, value) in overrides {
            match (merged.get_mut(&nutrient), value) {
                (Some(Value::Object(params)), Value::Object(supplied)) => params.extend(supplied),
                (_, value) => {
                    merged.insert(nutrient, value);
                }
            }
        }

        serde_json::from_value(Value::Object(merged)).map_err(StoreError::GuidelineValue)
    }

    /// Read and merge a guideline file
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value = serde_json::from_str(&text).map_err(StoreError::GuidelineParse)?;
        Self::merged(document)
    }
}
