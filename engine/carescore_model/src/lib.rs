//! Scoring backends for the carescore prediction engine
//!
//! Trained scorers are treated as opaque functions from an ordered feature
//! row to a [`ScoreOutput`]. They are persisted as JSON bundles carrying the
//! model definition and, optionally, the feature-name order the model was
//! trained with.

pub mod backend;
pub mod backends;
pub mod bundle;
pub mod calibration;
pub mod features;

pub use backend::{ModelError, ScoreOutput, Scorer};
pub use backends::{LinearBackend, LinearLink, LinearModel, Objective, Tree, TreeEnsemble, TreeNode};
pub use bundle::{ModelBundle, ModelSpec};
pub use calibration::sigmoid;
pub use features::FeatureMap;
