//! Code-generation backend interface.
//!
//! The driver never looks inside generated code. A front-end hands back a
//! [`ModuleHandle`], and the driver only asks it to serialize itself in one of
//! the two artifact forms.

pub mod ir;

use std::fmt::Debug;
use std::path::Path;

pub use ir::IrModule;

/// Opaque handle to a backend module.
///
/// Mirrors the shape of a C backend API: textual printing reports failure as
/// an error message, bitcode writing reports failure as a non-zero status.
pub trait ModuleHandle: Debug + Send + Sync {
    /// Backend-side module identifier.
    fn identifier(&self) -> &str;

    /// Print the textual intermediate representation to `path`.
    fn print_to_file(&self, path: &Path) -> Result<(), String>;

    /// Write the binary form to `path`. Returns 0 on success.
    fn write_bitcode_to_file(&self, path: &Path) -> i32;
}
