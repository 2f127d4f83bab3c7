//! Artifact store for the carescore engine
//!
//! Holds the immune and albumin model bundles plus the nutrition guideline
//! table as one immutable [`ArtifactSnapshot`]. Loading never fails as a
//! whole: each artifact is resolved and loaded independently and problems
//! are recorded per artifact, surfaced through [`ArtifactStore::status`].

pub mod config;
pub mod error;
pub mod guidelines;
pub mod snapshot;
pub mod store;

pub use config::{ArtifactKind, StoreConfig, ROOT_ENV_VAR};
pub use error::StoreError;
pub use guidelines::{
    CalciumGuideline, Guidelines, IronGuideline, Omega3Guideline, VitaminCGuideline,
    VitaminDGuideline,
};
pub use snapshot::{ArtifactSnapshot, LoadedModels, StoreStatus};
pub use store::ArtifactStore;
