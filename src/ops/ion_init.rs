//! Implementation of `ion init`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::manifest::{ManifestStore, DEFAULT_MANIFEST_TEMPLATE};
use crate::ops::errors::{DriverError, DriverResult};

/// Where to look for the default manifest template.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Look in `cwd` instead of `base_dir`
    pub debug: bool,
    /// Install base directory
    pub base_dir: PathBuf,
    /// Current working directory
    pub cwd: PathBuf,
}

impl InitOptions {
    pub fn template_path(&self) -> PathBuf {
        let dir = if self.debug { &self.cwd } else { &self.base_dir };
        dir.join(DEFAULT_MANIFEST_TEMPLATE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Reinitialized,
}

impl InitOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            InitOutcome::Created => "a default package manifest file",
            InitOutcome::Reinitialized => "existing package manifest (re-initialized)",
        }
    }
}

/// Copy the default template to `<root>/Ion.toml`, replacing any existing
/// manifest.
pub fn init_manifest(root: &Path, opts: &InitOptions) -> DriverResult<InitOutcome> {
    let template = opts.template_path();
    if !template.is_file() {
        return Err(DriverError::TemplateNotFound { path: template });
    }
    tracing::debug!("Using manifest template: {}", template.display());

    let store = ManifestStore::new(root);
    let destination = store.manifest_path();

    let outcome = if destination.exists() {
        tracing::debug!("Package manifest already exists, re-initializing.");
        remove_stale(&destination)?;
        tracing::debug!("Existing package manifest was deleted.");
        InitOutcome::Reinitialized
    } else {
        InitOutcome::Created
    };

    if let Err(source) = fs::copy(&template, &destination) {
        return Err(DriverError::ManifestCreate {
            path: destination,
            source: Some(source),
        });
    }

    if !store.exists() {
        return Err(DriverError::ManifestCreate {
            path: destination,
            source: None,
        });
    }

    Ok(outcome)
}

fn remove_stale(path: &Path) -> DriverResult<()> {
    let stale = |source: std::io::Error| DriverError::StaleManifest {
        path: path.to_path_buf(),
        source,
    };

    fs::remove_file(path).map_err(stale)?;

    if path.exists() {
        return Err(stale(std::io::Error::new(
            std::io::ErrorKind::Other,
            "file still present after deletion",
        )));
    }
    Ok(())
}
