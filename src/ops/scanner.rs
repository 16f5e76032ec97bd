//! Source discovery.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::ops::errors::{DriverError, DriverResult};

/// Extension of Ion source files.
pub const SOURCE_EXTENSION: &str = "ion";

/// Walks a source root and returns the files to compile.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    root: PathBuf,
    skip_dir: Option<PathBuf>,
    exclude: Vec<Pattern>,
}

impl SourceScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SourceScanner {
            root: root.into(),
            skip_dir: None,
            exclude: Vec::new(),
        }
    }

    /// Skip a directory (typically the output directory) if it is nested
    /// under the root.
    pub fn skip_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.skip_dir = Some(dir.into());
        self
    }

    /// Exclude paths matching any of the glob patterns, matched against the
    /// path relative to the root with `/` separators.
    pub fn exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> DriverResult<Self> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = Pattern::new(pattern).map_err(|e| DriverError::Scan {
                path: self.root.clone(),
                message: format!("invalid exclude pattern `{}`: {}", pattern, e),
            })?;
            self.exclude.push(compiled);
        }
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan for source files, sorted by path.
    pub fn scan(&self) -> DriverResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.keep_entry(e));

        for entry in walker {
            let entry = entry.map_err(|e| DriverError::Scan {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone()),
                message: e.to_string(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
                continue;
            }
            if self.is_excluded(path) {
                tracing::debug!("excluded {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        let hidden = entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false);
        if hidden {
            return false;
        }

        match &self.skip_dir {
            Some(skip) => entry.path() != skip.as_path(),
            None => true,
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        self.exclude.iter().any(|p| p.matches(&relative))
    }
}
