//! Ion - compiler driver for the Ion language
//!
//! This crate turns a project directory and its `Ion.toml` manifest into
//! compiled artifacts or an executed program: operation resolution,
//! toolchain verification, source scanning, per-file compilation and
//! artifact emission.

pub mod backend;
pub mod core;
pub mod engine;
pub mod frontend;
pub mod ops;
pub mod util;

pub use crate::core::{
    manifest::{ManifestStore, Package},
    operation::{Operation, OperationType},
    options::Options,
    project::{CompiledUnit, Project},
};

pub use ops::driver::{Driver, Outcome};
pub use ops::errors::DriverError;
