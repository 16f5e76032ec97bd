//! The top-level invocation state machine.
//!
//! 1. Resolve the operation (before touching the filesystem)
//! 2. Verify the toolchain
//! 3. Resolve the working root
//! 4. `init`: write the manifest and stop
//! 5. Otherwise load the manifest, scan, compile and dispatch to an engine

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::manifest::ManifestStore;
use crate::core::operation::{Operation, OperationType};
use crate::core::options::Options;
use crate::core::tool::Platform;
use crate::engine::{Engine, EngineContext, EngineReport};
use crate::frontend::Frontend;
use crate::ops::coordinator::CompilationCoordinator;
use crate::ops::errors::{DriverError, DriverResult};
use crate::ops::integrity::check_integrity;
use crate::ops::ion_init::{init_manifest, InitOptions, InitOutcome};
use crate::ops::scanner::SourceScanner;
use crate::util::fs::{ensure_dir, normalize_path, resolve_against};
use crate::util::shell::{Shell, Status};

/// Paths derived during one invocation. Options stay untouched; everything
/// the driver works out lives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Canonical working root, where `Ion.toml` lives
    pub root: PathBuf,
    /// Directory that is scanned for sources
    pub source_root: PathBuf,
    /// Artifact directory
    pub output_dir: PathBuf,
}

/// A soft condition that ends the invocation early without failing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    NoSourceFiles,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::NoSourceFiles => f.write_str("No matching files discovered."),
        }
    }
}

/// How a successful invocation ended.
#[derive(Debug)]
pub enum Outcome {
    Initialized(InitOutcome),
    Completed(EngineReport),
    Stopped(Advisory),
}

/// Runs invocations against one front-end and host platform.
pub struct Driver<'a> {
    shell: Arc<Shell>,
    frontend: &'a dyn Frontend,
    platform: Platform,
}

impl<'a> Driver<'a> {
    pub fn new(shell: Arc<Shell>, frontend: &'a dyn Frontend) -> Self {
        Driver {
            shell,
            frontend,
            platform: Platform::current(),
        }
    }

    /// Pretend to run on another platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn process(&self, options: &Options) -> DriverResult<Outcome> {
        tracing::debug!("Using operation: {}", options.operation);
        let operation = resolve_operation(&options.operation)?;
        tracing::debug!("Requested operation is valid.");

        check_integrity(
            &self.shell,
            self.platform,
            &options.tools_dir(),
            options.no_integrity,
        )?;

        let cwd = std::env::current_dir().map_err(DriverError::CurrentDir)?;
        let root = resolve_root(options.root.as_deref(), &cwd)?;
        tracing::debug!("Using root directory: {}", root.display());

        if operation == Operation::Init {
            let init = InitOptions {
                debug: options.debug,
                base_dir: options.base_dir.clone(),
                cwd,
            };
            let outcome = init_manifest(&root, &init)?;
            self.shell.status(Status::Created, outcome.message());
            return Ok(Outcome::Initialized(outcome));
        }

        let store = ManifestStore::new(&root);
        if !store.exists() {
            return Err(DriverError::ManifestNotFound { root });
        }
        let package = store.read()?;
        tracing::debug!("Package manifest file loaded.");

        let source_root = match package.source_root() {
            Some(dir) => {
                let dir = normalize_path(&resolve_against(&root, dir));
                if !dir.is_dir() {
                    return Err(DriverError::SourceRootNotFound { path: dir });
                }
                tracing::debug!(
                    "Using source root directory from package manifest: {}",
                    dir.display()
                );
                dir
            }
            None => root.clone(),
        };

        let paths = ResolvedPaths {
            output_dir: options.output_dir(&root),
            source_root,
            root,
        };

        let files = SourceScanner::new(&paths.source_root)
            .skip_dir(&paths.output_dir)
            .exclude(package.exclude())?
            .scan()?;

        if files.is_empty() {
            let advisory = Advisory::NoSourceFiles;
            self.shell.warn(advisory);
            return Ok(Outcome::Stopped(advisory));
        }

        let created = ensure_dir(&paths.output_dir).map_err(|source| DriverError::OutputDirectory {
            path: paths.output_dir.clone(),
            source,
        })?;
        if created {
            tracing::debug!("Created output directory.");
        }

        let project = CompilationCoordinator::new(self.frontend, Arc::clone(&self.shell))
            .jobs(options.jobs)
            .compile(&paths.source_root, &files)?;

        let engine = Engine::for_operation(operation).ok_or_else(|| {
            DriverError::Internal(format!("no engine handles operation `{}`", operation))
        })?;

        let ctx = EngineContext {
            options,
            package: &package,
            store: &store,
            paths: &paths,
            project,
            shell: Arc::clone(&self.shell),
            platform: self.platform,
        };

        engine.invoke(ctx).map(Outcome::Completed)
    }
}

/// Resolve an operation name, rejecting unknown ones.
pub fn resolve_operation(value: &str) -> DriverResult<Operation> {
    Operation::try_from(OperationType::resolve(value)).map_err(|_| DriverError::UnknownOperation {
        operation: value.to_string(),
    })
}

/// The explicit root (relative to `cwd`) or `cwd` itself, canonicalized.
pub fn resolve_root(explicit: Option<&Path>, cwd: &Path) -> DriverResult<PathBuf> {
    let root = match explicit {
        Some(path) if !path.as_os_str().is_empty() => resolve_against(cwd, path),
        _ => cwd.to_path_buf(),
    };

    if !root.is_dir() {
        return Err(DriverError::RootNotFound { path: root });
    }

    Ok(normalize_path(&root))
}
