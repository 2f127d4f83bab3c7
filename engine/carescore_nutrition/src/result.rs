use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    #[default]
    #[serde(rename = "rule-based")]
    RuleBased,
    #[serde(rename = "ml")]
    Ml,
}

/// Result keys, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionKey {
    Albumin,
    Hemoglobin,
    VitaminD,
    FractureRisk,
    CvdRisk,
    VitaminC,
}

/// Projected effect on one clinical parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionResult {
    pub parameter: String,
    pub current_value: Option<f64>,
    pub expected_value: Option<f64>,
    pub expected_change: Option<f64>,
    pub interpretation: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub monitoring_recommendations: Vec<String>,
    #[serde(default)]
    pub model_type: ModelType,
}

impl NutritionResult {
    pub fn new(parameter: impl Into<String>, interpretation: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            current_value: None,
            expected_value: None,
            expected_change: None,
            interpretation: interpretation.into(),
            warnings: Vec::new(),
            contraindications: Vec::new(),
            monitoring_recommendations: Vec::new(),
            model_type: ModelType::RuleBased,
        }
    }

    pub fn with_values(
        mut self,
        current: Option<f64>,
        expected: Option<f64>,
        change: Option<f64>,
    ) -> Self {
        self.current_value = current;
        self.expected_value = expected;
        self.expected_change = change;
        self
    }

    pub fn with_monitoring<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.monitoring_recommendations
            .extend(items.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutritionSource {
    #[serde(rename = "ml+rule")]
    MlRule,
    #[serde(rename = "rule-based")]
    RuleBased,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionSimulation {
    pub source: NutritionSource,
    pub results: BTreeMap<NutritionKey, NutritionResult>,
    /// Advisories about the simulation as a whole
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_serialize_in_reporting_order() {
        let mut results = BTreeMap::new();
        results.insert(NutritionKey::VitaminC, NutritionResult::new("Vitamin C Status", "ok"));
        results.insert(NutritionKey::Albumin, NutritionResult::new("Albumin", "ok"));
        let sim = NutritionSimulation {
            source: NutritionSource::MlRule,
            results,
            warnings: Vec::new(),
        };
        let json = serde_json::to_string(&sim).unwrap();
        assert!(json.starts_with(r#"{"source":"ml+rule","results":{"albumin":"#));
        assert!(json.find("\"albumin\"") < json.find("\"vitamin_c\""));
        assert!(json.contains(r#""model_type":"rule-based""#));
    }
}
