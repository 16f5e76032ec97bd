//! Toolchain integrity verification.
//!
//! Runs once per invocation before any operation-specific work. Platforms
//! that ship bundled tool binaries must have every tool from the tool table
//! present in the tools directory.

use std::path::{Path, PathBuf};

use crate::core::tool::{Platform, ToolDefinition, ToolResolver, ToolType, TOOLS};
use crate::ops::errors::{DriverError, DriverResult};
use crate::util::shell::Shell;

/// What the verifier checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    pub platform: Platform,
    /// Tools found on disk, empty when the platform needs no bundled tools
    pub tools: Vec<(ToolType, PathBuf)>,
}

/// Checks host platform support and the presence of bundled tools.
#[derive(Debug, Clone)]
pub struct ToolchainVerifier<'a> {
    platform: Platform,
    tools_dir: PathBuf,
    table: &'a [(ToolType, ToolDefinition)],
}

impl ToolchainVerifier<'static> {
    /// Verifier over the built-in tool table.
    pub fn new(platform: Platform, tools_dir: impl Into<PathBuf>) -> Self {
        ToolchainVerifier::with_table(platform, tools_dir, TOOLS)
    }
}

impl<'a> ToolchainVerifier<'a> {
    /// Verifier over a custom tool table.
    pub fn with_table(
        platform: Platform,
        tools_dir: impl Into<PathBuf>,
        table: &'a [(ToolType, ToolDefinition)],
    ) -> Self {
        ToolchainVerifier {
            platform,
            tools_dir: tools_dir.into(),
            table,
        }
    }

    pub fn tools_dir(&self) -> &Path {
        &self.tools_dir
    }

    pub fn invoke(&self) -> DriverResult<IntegrityReport> {
        if self.platform == Platform::MacOs {
            return Err(DriverError::UnsupportedPlatform {
                platform: self.platform,
            });
        }

        let mut report = IntegrityReport {
            platform: self.platform,
            tools: Vec::new(),
        };

        if !self.platform.bundles_tools() {
            tracing::debug!("{} does not require bundled tools", self.platform);
            return Ok(report);
        }

        if !self.tools_dir.is_dir() {
            return Err(DriverError::ToolsDirectoryMissing {
                path: self.tools_dir.clone(),
            });
        }

        // The whole table is validated before the first file check.
        for (tool, def) in self.table {
            if def.file_name.is_empty() {
                return Err(DriverError::Internal(format!(
                    "tool definition for `{}` has an empty file name",
                    tool
                )));
            }
        }

        let resolver = ToolResolver::new(self.platform, Some(self.tools_dir.clone()));
        for (tool, def) in self.table {
            let path = self.tools_dir.join(resolver.file_name(def));
            if !path.is_file() {
                return Err(DriverError::ToolMissing { tool: *tool, path });
            }
            tracing::debug!("found {} at {}", tool, path.display());
            report.tools.push((*tool, path));
        }

        Ok(report)
    }
}

/// Run the verifier unless the check was disabled on the command line.
pub fn check_integrity(
    shell: &Shell,
    platform: Platform,
    tools_dir: &Path,
    disabled: bool,
) -> DriverResult<Option<IntegrityReport>> {
    if disabled {
        shell.note("Integrity check is disabled.");
        return Ok(None);
    }

    ToolchainVerifier::new(platform, tools_dir).invoke().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tools_dir_with(files: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for file in files {
            std::fs::write(tmp.path().join(file), "").unwrap();
        }
        tmp
    }

    #[test]
    fn test_macos_is_unsupported() {
        let err = ToolchainVerifier::new(Platform::MacOs, "tools").invoke().unwrap_err();
        assert!(matches!(err, DriverError::UnsupportedPlatform { .. }));
        assert_eq!(err.to_string(), "macOS is not currently supported");
    }

    #[test]
    fn test_linux_skips_tool_check() {
        let report = ToolchainVerifier::new(Platform::Linux, "/does/not/exist")
            .invoke()
            .unwrap();
        assert!(report.tools.is_empty());
    }

    #[test]
    fn test_windows_requires_tools_dir() {
        let err = ToolchainVerifier::new(Platform::Windows, "/does/not/exist")
            .invoke()
            .unwrap_err();
        assert!(matches!(err, DriverError::ToolsDirectoryMissing { .. }));
    }

    #[test]
    fn test_windows_with_all_tools() {
        let tmp = tools_dir_with(&["lli.exe", "llc.exe"]);
        let report = ToolchainVerifier::new(Platform::Windows, tmp.path())
            .invoke()
            .unwrap();
        assert_eq!(report.tools.len(), TOOLS.len());
    }

    #[test]
    fn test_missing_tool_is_named_and_restoring_passes() {
        let tmp = tools_dir_with(&["lli.exe"]);
        let verifier = ToolchainVerifier::new(Platform::Windows, tmp.path());

        match verifier.invoke().unwrap_err() {
            DriverError::ToolMissing { tool, path } => {
                assert_eq!(tool, ToolType::Llc);
                assert_eq!(path, tmp.path().join("llc.exe"));
            }
            other => panic!("unexpected error: {other}"),
        }

        std::fs::write(tmp.path().join("llc.exe"), "").unwrap();
        assert!(verifier.invoke().is_ok());
    }

    #[test]
    fn test_empty_definition_halts_before_file_checks() {
        // llc is missing on disk, but the broken lli entry must win.
        let tmp = tools_dir_with(&[]);
        let table = [
            (ToolType::Llc, ToolDefinition { file_name: "llc" }),
            (ToolType::Lli, ToolDefinition { file_name: "" }),
        ];
        let err = ToolchainVerifier::with_table(Platform::Windows, tmp.path(), &table)
            .invoke()
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_disabled_check() {
        let shell = Shell::from_flags(true, false, crate::util::shell::ColorChoice::Never);
        let report = check_integrity(&shell, Platform::MacOs, Path::new("tools"), true).unwrap();
        assert!(report.is_none());
    }
}
