//! Artifact serialization.

use std::path::{Path, PathBuf};

use crate::core::options::ArtifactFormat;
use crate::core::project::CompiledUnit;
use crate::ops::errors::{DriverError, DriverResult};
use crate::util::hash::sha256_bytes;

/// One artifact on disk, read back after writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedArtifact {
    pub unit: String,
    pub path: PathBuf,
    pub format: ArtifactFormat,
    pub bytes: Vec<u8>,
    /// Lowercase hex sha256 of `bytes`
    pub digest: String,
}

impl EmittedArtifact {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Writes compiled units into the output directory.
#[derive(Debug, Clone)]
pub struct ArtifactEmitter {
    output_dir: PathBuf,
    format: ArtifactFormat,
}

impl ArtifactEmitter {
    pub fn new(output_dir: impl Into<PathBuf>, format: ArtifactFormat) -> Self {
        ArtifactEmitter {
            output_dir: output_dir.into(),
            format,
        }
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    /// `<output>/<unit>.<ext>`
    pub fn target_path(&self, unit_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", unit_name, self.format.extension()))
    }

    /// Serialize one unit, then read the file back. Partial files are left
    /// in place on failure.
    pub fn emit(&self, unit: &CompiledUnit) -> DriverResult<EmittedArtifact> {
        let path = self.target_path(unit.name());
        let module = unit.module();

        match self.format {
            ArtifactFormat::Text => {
                module.print_to_file(&path).map_err(|message| DriverError::Emit {
                    form: "IR",
                    path: path.clone(),
                    message,
                })?;
            }
            ArtifactFormat::Bitcode => {
                let status = module.write_bitcode_to_file(&path);
                if status != 0 {
                    return Err(DriverError::Emit {
                        form: "bitcode",
                        path,
                        message: format!("writer returned status {}", status),
                    });
                }
            }
        }

        let bytes = read_back(&path)?;
        let digest = sha256_bytes(&bytes);

        Ok(EmittedArtifact {
            unit: unit.name().to_string(),
            path,
            format: self.format,
            bytes,
            digest,
        })
    }
}

fn read_back(path: &Path) -> DriverResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| DriverError::ReadArtifact {
        path: path.to_path_buf(),
        source,
    })
}
