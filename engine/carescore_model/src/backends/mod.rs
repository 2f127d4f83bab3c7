//! Backend implementations for the supported model families

pub mod linear;
pub mod tree;

pub use linear::{LinearBackend, LinearLink, LinearModel};
pub use tree::{Objective, Tree, TreeEnsemble, TreeNode};
