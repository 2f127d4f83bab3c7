//! Patient and intervention-plan records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M", alias = "남")]
    Male,
    #[default]
    #[serde(rename = "F", alias = "여")]
    Female,
}

/// Patient state at the start of an intervention.
///
/// Every lab is optional; consumers substitute their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionPatient {
    pub age: f64,
    pub sex: Sex,
    pub hemoglobin: Option<f64>,
    pub ferritin: Option<f64>,
    pub tsat: Option<f64>,
    pub albumin: Option<f64>,
    pub vitamin_d: Option<f64>,
    pub calcium: Option<f64>,
    pub crp: Option<f64>,
    pub bun: Option<f64>,
    pub creatinine: Option<f64>,
    pub glucose: Option<f64>,
    pub sodium: Option<f64>,
    pub potassium: Option<f64>,
    pub chloride: Option<f64>,
    pub bicarbonate: Option<f64>,
    pub wbc: Option<f64>,
    pub platelet: Option<f64>,
    pub ckd_stage: u8,
    pub smoker: bool,
    pub immune_compromised: bool,
    pub chronic_inflammation: bool,
    pub kidney_stone_history: bool,
    pub hemochromatosis: bool,
    pub hypercalcemia: bool,
    pub fracture_risk_high: bool,
}

impl NutritionPatient {
    pub fn new(age: f64) -> Self {
        Self {
            age,
            ..Self::default()
        }
    }

    /// CKD stage 3 or worse
    pub fn advanced_ckd(&self) -> bool {
        self.ckd_stage >= 3
    }
}

/// Daily doses over a number of weeks. A missing or zero dose means the
/// nutrient is not part of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionPlan {
    pub iron_mg: Option<f64>,
    pub vitamin_d_iu: Option<f64>,
    pub calcium_mg: Option<f64>,
    #[serde(alias = "omega3_g")]
    pub omega3_epa_dha_g: Option<f64>,
    pub vitamin_c_mg: Option<f64>,
    pub protein_g: Option<f64>,
    pub duration_weeks: u32,
}

impl Default for InterventionPlan {
    fn default() -> Self {
        Self {
            iron_mg: None,
            vitamin_d_iu: None,
            calcium_mg: None,
            omega3_epa_dha_g: None,
            vitamin_c_mg: None,
            protein_g: None,
            duration_weeks: 4,
        }
    }
}

fn active(dose: Option<f64>) -> Option<f64> {
    dose.filter(|d| *d != 0.0)
}

impl InterventionPlan {
    pub fn weeks(&self) -> f64 {
        f64::from(self.duration_weeks)
    }

    pub fn iron(&self) -> Option<f64> {
        active(self.iron_mg)
    }

    pub fn vitamin_d(&self) -> Option<f64> {
        active(self.vitamin_d_iu)
    }

    pub fn calcium(&self) -> Option<f64> {
        active(self.calcium_mg)
    }

    pub fn omega3(&self) -> Option<f64> {
        active(self.omega3_epa_dha_g)
    }

    pub fn vitamin_c(&self) -> Option<f64> {
        active(self.vitamin_c_mg)
    }
}
