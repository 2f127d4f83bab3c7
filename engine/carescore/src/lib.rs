//! carescore: immune risk and nutrition intervention scoring
//!
//! [`CareScoreService`] wires the immune predictor and the nutrition
//! simulator to one shared [`ArtifactStore`] and exposes the operations a
//! transport layer needs. The request and response records mirror the JSON
//! documents the service exchanges.

pub mod session;

use carescore_immune::{ImmuneInput, ImmunePredictor, ImmuneResult};
use carescore_nutrition::{InterventionPlan, NutritionPatient, NutritionSimulation, NutritionSimulator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use carescore_immune::ImmuneRequest;
pub use carescore_model::{ModelBundle, ModelError};
pub use carescore_store::{ArtifactStore, StoreConfig, StoreStatus};
pub use session::Session;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImmuneBatchRequest {
    #[serde(default)]
    pub items: Vec<ImmuneRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmuneBatchResponse {
    pub items: Vec<ImmuneResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRequest {
    pub patient: NutritionPatient,
    pub intervention: InterventionPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Ok,
    Reloaded,
}

/// Store status wrapped for health and reload responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: ReportStatus,
    pub models: StoreStatus,
}

pub struct CareScoreService {
    store: Arc<ArtifactStore>,
    immune: ImmunePredictor,
    nutrition: NutritionSimulator,
}

impl CareScoreService {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self {
            immune: ImmunePredictor::new(Arc::clone(&store)),
            nutrition: NutritionSimulator::new(Arc::clone(&store)),
            store,
        }
    }

    /// Open a store at `config` and serve from it
    pub fn open(config: StoreConfig) -> Self {
        Self::new(Arc::new(ArtifactStore::open(config)))
    }

    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    pub fn predict_immune(&self, resident_id: Option<String>, input: &ImmuneInput) -> ImmuneResult {
        self.immune.predict(resident_id, input)
    }

    pub fn predict_immune_batch(&self, batch: &ImmuneBatchRequest) -> ImmuneBatchResponse {
        ImmuneBatchResponse {
            items: self.immune.predict_batch(&batch.items),
        }
    }

    pub fn simulate_nutrition(
        &self,
        patient: &NutritionPatient,
        plan: &InterventionPlan,
    ) -> NutritionSimulation {
        self.nutrition.simulate(patient, plan)
    }

    pub fn status(&self) -> StoreStatus {
        self.store.status()
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: ReportStatus::Ok,
            models: self.status(),
        }
    }

    pub fn reload(&self) -> HealthReport {
        HealthReport {
            status: ReportStatus::Reloaded,
            models: self.store.reload(),
        }
    }
}

impl std::fmt::Debug for CareScoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CareScoreService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
