//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ensure a directory exists, creating it if necessary. Returns whether it
/// had to be created.
pub fn ensure_dir(path: &Path) -> io::Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    Ok(true)
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    canonicalize_plain(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Canonicalize without the `\\?\` prefix Windows adds to verbatim paths, so
/// paths stay readable in messages.
fn canonicalize_plain(path: &Path) -> io::Result<PathBuf> {
    let canonical = path.canonicalize()?;

    #[cfg(windows)]
    {
        let text = canonical.to_string_lossy();
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            if !stripped.starts_with("UNC") {
                return Ok(PathBuf::from(stripped));
            }
        }
    }

    Ok(canonical)
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
