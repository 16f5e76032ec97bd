//! Ion.toml manifest parsing and schema.
//!
//! The manifest is the declarative description of an Ion package. It lives at
//! the project root as `Ion.toml`; `ion init` creates it from the bundled
//! `Ion.default.toml` template.

use std::fs;
use std::path::{Path, PathBuf};

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical manifest filename.
pub const MANIFEST_NAME: &str = "Ion.toml";

/// Filename of the bundled default manifest used by `ion init`.
pub const DEFAULT_MANIFEST_TEMPLATE: &str = "Ion.default.toml";

/// Default entry unit for `ion run`.
pub const DEFAULT_ENTRY: &str = "main";

/// Errors raised while reading or updating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest `{}`: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid manifest `{}`: {message}", path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("failed to write manifest `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The decoded package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Uniquely identifying package name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Package version (semver)
    pub version: String,

    /// Build iteration, incremented after every successful build
    #[serde(default)]
    pub build: u64,

    /// Author name or contact information
    #[serde(default)]
    pub author: Option<String>,

    /// Packages used by this one, in declaration order
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Compiler options
    #[serde(default)]
    pub options: Option<PackageOptions>,
}

/// A dependency record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Dependency package name
    pub name: String,

    /// Version requirement (e.g. `^1.2`)
    #[serde(default = "any_version")]
    pub version: String,
}

fn any_version() -> String {
    "*".to_string()
}

/// The `[options]` block of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageOptions {
    /// Directory to scan for sources, relative to the manifest directory.
    /// Overrides the root passed on the command line.
    #[serde(default)]
    pub source_root: Option<PathBuf>,

    /// Unit executed by `ion run`
    #[serde(default)]
    pub entry: Option<String>,

    /// Glob patterns (relative to the source root) excluded from scanning
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
struct RawManifest {
    package: RawPackage,

    #[serde(default)]
    dependencies: Vec<Dependency>,

    #[serde(default)]
    options: Option<PackageOptions>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,

    #[serde(default)]
    description: Option<String>,

    version: String,

    #[serde(default)]
    build: u64,

    #[serde(default)]
    author: Option<String>,
}

impl Package {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    /// Parse manifest content. `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(content).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

        let invalid = |message: String| ManifestError::Invalid {
            path: path.to_path_buf(),
            message,
        };

        if raw.package.name.trim().is_empty() {
            return Err(invalid("package name cannot be empty".to_string()));
        }

        raw.package
            .version
            .parse::<Version>()
            .map_err(|e| invalid(format!("invalid version `{}`: {}", raw.package.version, e)))?;

        for dep in &raw.dependencies {
            dep.version.parse::<VersionReq>().map_err(|e| {
                invalid(format!(
                    "dependency `{}` has invalid version requirement `{}`: {}",
                    dep.name, dep.version, e
                ))
            })?;
        }

        if let Some(entry) = raw.options.as_ref().and_then(|o| o.entry.as_ref()) {
            if entry.trim().is_empty() {
                return Err(invalid("options.entry cannot be empty".to_string()));
            }
        }

        Ok(Package {
            name: raw.package.name,
            description: raw.package.description,
            version: raw.package.version,
            build: raw.package.build,
            author: raw.package.author,
            dependencies: raw.dependencies,
            options: raw.options,
        })
    }

    /// Parse the version string as semver.
    pub fn version(&self) -> Option<Version> {
        self.version.parse().ok()
    }

    /// The source root override, if the options block declares one.
    pub fn source_root(&self) -> Option<&Path> {
        self.options.as_ref()?.source_root.as_deref()
    }

    /// The unit executed by `ion run`.
    pub fn entry(&self) -> &str {
        self.options
            .as_ref()
            .and_then(|o| o.entry.as_deref())
            .unwrap_or(DEFAULT_ENTRY)
    }

    /// Exclusion patterns for source scanning.
    pub fn exclude(&self) -> &[String] {
        self.options
            .as_ref()
            .map(|o| o.exclude.as_slice())
            .unwrap_or(&[])
    }
}

/// Locates and reads the manifest of a project root.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ManifestStore { root: root.into() }
    }

    /// Directory the manifest lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `Ion.toml` under the root.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_NAME)
    }

    /// Whether the manifest exists.
    pub fn exists(&self) -> bool {
        self.manifest_path().is_file()
    }

    /// Read and decode the manifest.
    pub fn read(&self) -> Result<Package, ManifestError> {
        Package::load(&self.manifest_path())
    }

    /// Increment the `build` counter in place, keeping the rest of the file
    /// (comments, ordering, formatting) untouched. Returns the new value.
    pub fn bump_build(&self) -> Result<u64, ManifestError> {
        let path = self.manifest_path();
        let content = fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;

        let mut doc: toml_edit::DocumentMut =
            content.parse().map_err(|e: toml_edit::TomlError| ManifestError::Parse {
                path: path.clone(),
                message: e.message().to_string(),
            })?;

        let package = doc
            .get_mut("package")
            .and_then(|item| item.as_table_like_mut())
            .ok_or_else(|| ManifestError::Invalid {
                path: path.clone(),
                message: "missing [package] table".to_string(),
            })?;

        let current = match package.get("build") {
            None => 0,
            Some(item) => item
                .as_integer()
                .filter(|n| *n >= 0)
                .ok_or_else(|| ManifestError::Invalid {
                    path: path.clone(),
                    message: "package.build must be a non-negative integer".to_string(),
                })?,
        };

        let next = current.checked_add(1).ok_or_else(|| ManifestError::Invalid {
            path: path.clone(),
            message: "package.build cannot be incremented any further".to_string(),
        })?;
        package.insert("build", toml_edit::value(next));

        fs::write(&path, doc.to_string()).map_err(|source| ManifestError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(next as u64)
    }
}
