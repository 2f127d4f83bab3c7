//! Immutable artifact snapshot and its status report

use crate::config::{ArtifactKind, StoreConfig};
use crate::error::StoreError;
use crate::guidelines::Guidelines;
use carescore_model::ModelBundle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything the predictors read, loaded together.
///
/// A snapshot is never mutated once published; a reload builds a new one.
#[derive(Debug)]
pub struct ArtifactSnapshot {
    pub immune: Option<ModelBundle>,
    pub albumin: Option<ModelBundle>,
    pub guidelines: Guidelines,
    /// Artifact name to load error message
    pub errors: BTreeMap<String, String>,
    /// Artifact name to resolved path, `None` when nothing was found
    pub paths: BTreeMap<String, Option<PathBuf>>,
    pub loaded_at: DateTime<Utc>,
}

impl Default for ArtifactSnapshot {
    fn default() -> Self {
        Self::new(Guidelines::default())
    }
}

impl ArtifactSnapshot {
    /// A snapshot without models
    pub fn new(guidelines: Guidelines) -> Self {
        Self {
            immune: None,
            albumin: None,
            guidelines,
            errors: BTreeMap::new(),
            paths: BTreeMap::new(),
            loaded_at: Utc::now(),
        }
    }

    pub fn with_immune(mut self, bundle: ModelBundle) -> Self {
        self.immune = Some(bundle);
        self
    }

    pub fn with_albumin(mut self, bundle: ModelBundle) -> Self {
        self.albumin = Some(bundle);
        self
    }

    /// Resolve and load every artifact named by `config`.
    ///
    /// Each artifact is independent: a failure is logged and recorded under
    /// the artifact's name, and the rest still load.
    pub fn load(config: &StoreConfig) -> Self {
        let mut snapshot = Self::default();
        for kind in ArtifactKind::ALL {
            let path = config.resolve(kind);
            snapshot.paths.insert(kind.name().to_string(), path.clone());
            let outcome = match path {
                Some(path) => snapshot.load_artifact(kind, &path),
                None if kind == ArtifactKind::Guidelines => Err(StoreError::GuidelinesNotFound),
                None => Err(StoreError::ArtifactNotFound { name: kind.name() }),
            };
            if let Err(err) = outcome {
                log::warn!("{} artifact unavailable: {err}", kind.name());
                snapshot.errors.insert(kind.name().to_string(), err.to_string());
            }
        }
        snapshot
    }

    fn load_artifact(&mut self, kind: ArtifactKind, path: &Path) -> Result<(), StoreError> {
        match kind {
            ArtifactKind::Immune => self.immune = Some(ModelBundle::load(path)?),
            ArtifactKind::Albumin => self.albumin = Some(ModelBundle::load(path)?),
            ArtifactKind::Guidelines => self.guidelines = Guidelines::load(path)?,
        }
        log::info!("loaded {} artifact from {}", kind.name(), path.display());
        Ok(())
    }

    pub fn status(&self, project_root: &Path) -> StoreStatus {
        StoreStatus {
            project_root: project_root.to_path_buf(),
            loaded_at: self.loaded_at,
            loaded: LoadedModels {
                immune_model: self.immune.is_some(),
                albumin_model: self.albumin.is_some(),
            },
            paths: self.paths.clone(),
            errors: self.errors.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedModels {
    pub immune_model: bool,
    pub albumin_model: bool,
}

/// Health view of the current snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub project_root: PathBuf,
    pub loaded_at: DateTime<Utc>,
    pub loaded: LoadedModels,
    pub paths: BTreeMap<String, Option<PathBuf>>,
    pub errors: BTreeMap<String, String>,
}
