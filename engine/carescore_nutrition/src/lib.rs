//! Nutrition intervention simulator
//!
//! Projects the effect of a supplement plan on a patient's labs. Albumin
//! comes from the albumin model when one is loaded; iron, vitamin D,
//! calcium, omega-3 and vitamin C come from guideline-driven rule blocks.

pub mod features;
pub mod input;
pub mod result;
pub mod rules;
pub mod simulator;

pub use features::albumin_features;
pub use input::{InterventionPlan, NutritionPatient, Sex};
pub use result::{ModelType, NutritionKey, NutritionResult, NutritionSimulation, NutritionSource};
pub use simulator::{simulate_with, NutritionSimulator, EMPTY_PLAN_WARNING};
