//! High-level operations.
//!
//! The driver and the pipeline stages it coordinates.

pub mod coordinator;
pub mod driver;
pub mod emitter;
pub mod errors;
pub mod integrity;
pub mod ion_init;
pub mod scanner;

pub use coordinator::CompilationCoordinator;
pub use driver::{resolve_operation, resolve_root, Advisory, Driver, Outcome, ResolvedPaths};
pub use emitter::{ArtifactEmitter, EmittedArtifact};
pub use errors::{DriverError, DriverResult};
pub use integrity::{check_integrity, IntegrityReport, ToolchainVerifier};
pub use ion_init::{init_manifest, InitOptions, InitOutcome};
pub use scanner::SourceScanner;
