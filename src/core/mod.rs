//! Core data structures for Ion.
//!
//! - Operations and invocation options
//! - The package manifest
//! - The compilation project and its units
//! - Auxiliary tools and host platforms

pub mod manifest;
pub mod operation;
pub mod options;
pub mod project;
pub mod tool;

pub use manifest::{ManifestStore, Package, MANIFEST_NAME};
pub use operation::{Operation, OperationType};
pub use options::{ArtifactFormat, Options};
pub use project::{CompiledUnit, Project};
pub use tool::{Platform, ToolType};
