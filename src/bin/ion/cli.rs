//! CLI definitions using clap.

use std::path::{Path, PathBuf};

use clap::Parser;

use ion::core::Options;
use ion::util::shell::{ColorChoice, Shell};

/// Ion - compiler driver for the Ion language
#[derive(Parser, Debug)]
#[command(name = "ion")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Operation to perform: init, build or run
    pub operation: String,

    /// Project root directory (defaults to the current directory)
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Output directory for artifacts, relative to the project root
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Emit bitcode instead of textual IR
    #[arg(long)]
    pub bitcode: bool,

    /// Read the default manifest template from the current directory
    #[arg(long)]
    pub debug: bool,

    /// Skip the toolchain integrity check
    #[arg(long)]
    pub no_integrity: bool,

    /// Directory holding the toolchain binaries
    #[arg(long, value_name = "PATH", env = "ION_TOOLS_PATH")]
    pub tools_path: Option<PathBuf>,

    /// Number of parallel compile jobs
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Invocation options from the command line alone.
    pub fn options(&self) -> Options {
        let mut opts = Options::new(self.operation.clone());
        opts.root = self.root.clone();
        opts.output = self.output.clone();
        opts.bitcode = self.bitcode;
        opts.debug = self.debug;
        opts.no_integrity = self.no_integrity;
        opts.tools_path = self.tools_path.clone();
        opts.jobs = self.jobs;
        opts
    }

    /// Directory holding the project config: `--root` if given, else `cwd`.
    pub fn project_dir(&self, cwd: &Path) -> PathBuf {
        match &self.root {
            Some(root) if !root.as_os_str().is_empty() => cwd.join(root),
            _ => cwd.to_path_buf(),
        }
    }

    pub fn shell(&self) -> Shell {
        let color = if self.no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Shell::from_flags(self.quiet, self.verbose, color)
    }
}
