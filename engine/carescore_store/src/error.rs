use carescore_model::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Per-artifact load failures.
///
/// These are never returned from a store load; they are rendered into the
/// snapshot's error table instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{name} artifact not found")]
    ArtifactNotFound { name: &'static str },
    #[error("guideline file not found; default values loaded")]
    GuidelinesNotFound,
    #[error("guideline JSON must be an object")]
    GuidelineShape,
    #[error("malformed guideline JSON: {0}")]
    GuidelineParse(#[source] serde_json::Error),
    #[error("invalid guideline parameter: {0}")]
    GuidelineValue(#[source] serde_json::Error),
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}
