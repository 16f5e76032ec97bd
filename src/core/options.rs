//! Invocation options.
//!
//! Options are assembled once (command line merged over the config file) and
//! then only ever borrowed. Paths the driver derives later, such as the
//! canonical working root, live in [`crate::ops::driver::ResolvedPaths`].

use std::path::{Path, PathBuf};

use crate::util::config::IonConfig;

/// Default output directory, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Name of the tools directory inside the install base directory.
pub const TOOLS_DIR_NAME: &str = "tools";

/// Serialized form of build artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactFormat {
    /// Textual intermediate representation
    Text,
    /// Binary bitcode container
    Bitcode,
}

impl ArtifactFormat {
    pub fn from_bitcode_flag(bitcode: bool) -> Self {
        if bitcode {
            ArtifactFormat::Bitcode
        } else {
            ArtifactFormat::Text
        }
    }

    /// Artifact file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Text => "ir",
            ArtifactFormat::Bitcode => "bc",
        }
    }
}

/// Options for one invocation of the driver.
#[derive(Debug, Clone)]
pub struct Options {
    /// Requested operation name, resolved by the driver
    pub operation: String,

    /// Working root override (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Output directory for artifacts
    pub output: Option<PathBuf>,

    /// Emit bitcode instead of textual IR
    pub bitcode: bool,

    /// Development mode: the default manifest template is looked up in the
    /// current directory instead of the install directory
    pub debug: bool,

    /// Skip the toolchain integrity check
    pub no_integrity: bool,

    /// Tools directory override
    pub tools_path: Option<PathBuf>,

    /// Number of parallel compile jobs
    pub jobs: Option<usize>,

    /// Install base directory (where the executable lives)
    pub base_dir: PathBuf,
}

impl Options {
    /// Create options for an operation with everything else defaulted.
    pub fn new(operation: impl Into<String>) -> Self {
        Options {
            operation: operation.into(),
            root: None,
            output: None,
            bitcode: false,
            debug: false,
            no_integrity: false,
            tools_path: None,
            jobs: None,
            base_dir: install_base_dir(),
        }
    }

    /// Fill in settings the command line left unset from the config file.
    pub fn with_config(mut self, config: &IonConfig) -> Self {
        self.output = self.output.or_else(|| config.build.output.clone());
        self.bitcode = self.bitcode || config.build.bitcode;
        self.jobs = self.jobs.or(config.build.jobs);
        self.tools_path = self.tools_path.or_else(|| config.tools.path.clone());
        self
    }

    /// Artifact format selected by the bitcode flag.
    pub fn format(&self) -> ArtifactFormat {
        ArtifactFormat::from_bitcode_flag(self.bitcode)
    }

    /// Output directory. Relative paths are resolved against `project_root`.
    pub fn output_dir(&self, project_root: &Path) -> PathBuf {
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        if output.is_absolute() {
            output
        } else {
            project_root.join(output)
        }
    }

    /// Tools directory: the explicit override, else `<base>/tools`.
    pub fn tools_dir(&self) -> PathBuf {
        self.tools_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join(TOOLS_DIR_NAME))
    }
}

/// Directory containing the running executable, falling back to the current
/// directory.
pub fn install_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
