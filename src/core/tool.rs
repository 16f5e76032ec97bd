//! Auxiliary toolchain binaries and host platforms.

use std::fmt;
use std::path::{Path, PathBuf};

/// Host platform, as far as toolchain requirements are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Platform {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    /// Whether the installation ships its own tool binaries on this platform.
    pub fn bundles_tools(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Executable suffix for tool filenames.
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            _ => "",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
            Platform::Windows => "Windows",
            Platform::Other => "unknown platform",
        };
        f.write_str(name)
    }
}

/// Identifier of an auxiliary tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolType {
    /// LLVM IR interpreter, used by `ion run`
    Lli,
    /// LLVM static compiler
    Llc,
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolType::Lli => "lli",
            ToolType::Llc => "llc",
        };
        f.write_str(name)
    }
}

/// Static description of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDefinition {
    /// File name without the platform executable suffix
    pub file_name: &'static str,
}

/// Every tool the installation is expected to provide.
pub const TOOLS: &[(ToolType, ToolDefinition)] = &[
    (ToolType::Lli, ToolDefinition { file_name: "lli" }),
    (ToolType::Llc, ToolDefinition { file_name: "llc" }),
];

/// Look up the definition of a tool.
pub fn definition(tool: ToolType) -> Option<&'static ToolDefinition> {
    TOOLS.iter().find(|(t, _)| *t == tool).map(|(_, def)| def)
}

/// Resolves tool locations for one platform and tools directory.
#[derive(Debug, Clone)]
pub struct ToolResolver {
    platform: Platform,
    tools_dir: Option<PathBuf>,
}

impl ToolResolver {
    pub fn new(platform: Platform, tools_dir: Option<PathBuf>) -> Self {
        ToolResolver { platform, tools_dir }
    }

    pub fn tools_dir(&self) -> Option<&Path> {
        self.tools_dir.as_deref()
    }

    /// File name of a tool on this platform.
    pub fn file_name(&self, def: &ToolDefinition) -> String {
        format!("{}{}", def.file_name, self.platform.exe_suffix())
    }

    /// Expected path of a tool inside the tools directory.
    pub fn bundled_path(&self, def: &ToolDefinition) -> Option<PathBuf> {
        self.tools_dir.as_ref().map(|dir| dir.join(self.file_name(def)))
    }

    /// Locate a tool: the tools directory first, then `PATH`.
    pub fn locate(&self, tool: ToolType) -> Option<PathBuf> {
        let def = definition(tool)?;

        if let Some(path) = self.bundled_path(def).filter(|p| p.is_file()) {
            return Some(path);
        }

        crate::util::process::find_executable(def.file_name)
    }
}
