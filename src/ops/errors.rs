//! Driver error taxonomy.
//!
//! Every variant except [`DriverError::Internal`] is a user or configuration
//! error: bad input, a missing file, a broken installation. `Internal` marks a
//! defect in the driver itself and is reported differently.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::manifest::ManifestError;
use crate::core::tool::{Platform, ToolType};
use crate::frontend::FrontendError;

/// Exit status for user and configuration errors.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for internal consistency faults.
pub const EXIT_INTERNAL: i32 = 101;

/// An error that terminates the invocation.
#[derive(Debug, Error, Diagnostic)]
pub enum DriverError {
    #[error("unknown operation: '{operation}'")]
    #[diagnostic(
        code(ion::driver::unknown_operation),
        help("expected one of: init, build, run")
    )]
    UnknownOperation { operation: String },

    #[error("the specified root directory `{}` does not exist", path.display())]
    #[diagnostic(code(ion::driver::root_not_found))]
    RootNotFound { path: PathBuf },

    #[error("failed to determine the current directory")]
    #[diagnostic(code(ion::driver::cwd))]
    CurrentDir(#[source] std::io::Error),

    #[error("package manifest file does not exist in `{}`", root.display())]
    #[diagnostic(
        code(ion::manifest::not_found),
        help("run `ion init` to create a default package manifest")
    )]
    ManifestNotFound { root: PathBuf },

    #[error(transparent)]
    #[diagnostic(code(ion::manifest::invalid))]
    Manifest(#[from] ManifestError),

    #[error("source root directory `{}` from the package manifest does not exist", path.display())]
    #[diagnostic(code(ion::manifest::source_root))]
    SourceRootNotFound { path: PathBuf },

    #[error("default package manifest file `{}` does not exist", path.display())]
    #[diagnostic(
        code(ion::init::template_not_found),
        help("use `--debug` to read the template from the current directory")
    )]
    TemplateNotFound { path: PathBuf },

    #[error("unable to delete existing package manifest `{}`", path.display())]
    #[diagnostic(code(ion::init::stale_manifest))]
    StaleManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create default package manifest `{}`", path.display())]
    #[diagnostic(code(ion::init::create))]
    ManifestCreate {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("{platform} is not currently supported")]
    #[diagnostic(code(ion::integrity::platform))]
    UnsupportedPlatform { platform: Platform },

    #[error("tools directory `{}` does not exist", path.display())]
    #[diagnostic(
        code(ion::integrity::tools_dir),
        help("you may have a corrupt installation; reinstall or pass --tools-path")
    )]
    ToolsDirectoryMissing { path: PathBuf },

    #[error("required tool executable '{tool}' is missing at `{}`", path.display())]
    #[diagnostic(
        code(ion::integrity::tool_missing),
        help("you may have a corrupt installation")
    )]
    ToolMissing { tool: ToolType, path: PathBuf },

    #[error("failed to scan `{}`: {message}", path.display())]
    #[diagnostic(code(ion::scan::failed))]
    Scan { path: PathBuf, message: String },

    #[error("failed to create output directory `{}`", path.display())]
    #[diagnostic(code(ion::build::output_dir))]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile `{}`", file.display())]
    #[diagnostic(code(ion::compile::failed))]
    Compile {
        file: PathBuf,
        #[source]
        source: FrontendError,
    },

    #[error(
        "`{}` and `{}` both compile to unit `{unit}`",
        first.display(),
        second.display()
    )]
    #[diagnostic(
        code(ion::compile::duplicate_unit),
        help("rename one of the source files so their unit names differ")
    )]
    DuplicateUnit {
        unit: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("there was an error writing {form} to `{}`: {message}", path.display())]
    #[diagnostic(code(ion::emit::failed))]
    Emit {
        form: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("failed to read emitted artifact `{}`", path.display())]
    #[diagnostic(code(ion::emit::read_back))]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("entry unit `{entry}` was not found")]
    #[diagnostic(
        code(ion::run::entry_not_found),
        help("available units: {available}; set `entry` in the [options] block of Ion.toml")
    )]
    EntryNotFound { entry: String, available: String },

    #[error("could not find the `{tool}` interpreter")]
    #[diagnostic(
        code(ion::run::tool_not_found),
        help("install LLVM or pass --tools-path pointing at a directory containing it")
    )]
    ToolNotFound { tool: ToolType },

    #[error("failed to run `{command}`: {message}")]
    #[diagnostic(code(ion::run::execution))]
    Execution { command: String, message: String },

    #[error("{0}")]
    #[diagnostic(code(ion::internal))]
    Internal(String),
}

impl DriverError {
    /// Whether this error is a defect in the driver rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, DriverError::Internal(_))
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_internal() {
            EXIT_INTERNAL
        } else {
            EXIT_FAILURE
        }
    }

    /// Render the error as human-readable lines: the message, its causes,
    /// and a help line when one applies.
    pub fn render(&self) -> String {
        let mut out = if self.is_internal() {
            format!("internal error: {} (this is a bug in ion)\n", self)
        } else {
            format!("error: {}\n", self)
        };

        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(&format!("  caused by: {}\n", cause));
            source = cause.source();
        }

        if let Some(help) = self.help() {
            out.push_str(&format!("help: {}\n", help));
        }

        out
    }
}

pub type DriverResult<T> = Result<T, DriverError>;
