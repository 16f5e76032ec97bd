//! In-memory LLVM IR module.
//!
//! Textual output is plain LLVM assembly. The binary form is a small
//! container: the `IONB` magic, a little-endian format version, the length of
//! the uncompressed IR, then the deflate-compressed IR.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use super::ModuleHandle;

/// Magic bytes at the start of every bitcode container.
pub const BITCODE_MAGIC: &[u8; 4] = b"IONB";

/// Current container format version.
pub const BITCODE_VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 8;

/// A generated module holding its IR text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrModule {
    identifier: String,
    text: String,
}

impl IrModule {
    pub fn new(identifier: impl Into<String>, text: impl Into<String>) -> Self {
        IrModule {
            identifier: identifier.into(),
            text: text.into(),
        }
    }

    /// The module's IR text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Encode the module as a bitcode container.
    pub fn to_bitcode(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.text.len() / 2);
        out.extend_from_slice(BITCODE_MAGIC);
        out.extend_from_slice(&BITCODE_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.text.len() as u64).to_le_bytes());

        let mut encoder = DeflateEncoder::new(out, Compression::default());
        encoder.write_all(self.text.as_bytes())?;
        encoder.finish()
    }

    /// Decode a bitcode container back into IR text.
    pub fn from_bitcode(identifier: impl Into<String>, bytes: &[u8]) -> io::Result<Self> {
        let invalid = |msg: &str| io::Error::new(io::ErrorKind::InvalidData, msg.to_string());

        if bytes.len() < HEADER_LEN || &bytes[..4] != BITCODE_MAGIC {
            return Err(invalid("not an Ion bitcode container"));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != BITCODE_VERSION {
            return Err(invalid("unsupported bitcode container version"));
        }

        let mut len = [0u8; 8];
        len.copy_from_slice(&bytes[6..HEADER_LEN]);
        let len = u64::from_le_bytes(len) as usize;

        let mut text = String::with_capacity(len);
        DeflateDecoder::new(&bytes[HEADER_LEN..]).read_to_string(&mut text)?;
        if text.len() != len {
            return Err(invalid("bitcode container length mismatch"));
        }

        Ok(IrModule::new(identifier, text))
    }
}

impl ModuleHandle for IrModule {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn print_to_file(&self, path: &Path) -> Result<(), String> {
        fs::write(path, &self.text).map_err(|e| e.to_string())
    }

    fn write_bitcode_to_file(&self, path: &Path) -> i32 {
        let written = self
            .to_bitcode()
            .and_then(|bytes| File::create(path)?.write_all(&bytes));

        match written {
            Ok(()) => 0,
            Err(e) => {
                tracing::debug!("bitcode write to {} failed: {}", path.display(), e);
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> IrModule {
        IrModule::new("main", "define i32 @main() {\nentry:\n  ret i32 0\n}\n")
    }

    #[test]
    fn test_print_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("main.ir");

        sample().print_to_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), sample().text());
    }

    #[test]
    fn test_print_to_missing_directory_reports_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("main.ir");
        assert!(sample().print_to_file(&path).is_err());
    }

    #[test]
    fn test_bitcode_container() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("main.bc");

        assert_eq!(sample().write_bitcode_to_file(&path), 0);

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], BITCODE_MAGIC);

        let decoded = IrModule::from_bitcode("main", &bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_bitcode_write_failure_status() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("main.bc");
        assert_ne!(sample().write_bitcode_to_file(&path), 0);
    }

    #[test]
    fn test_from_bitcode_rejects_text() {
        let err = IrModule::from_bitcode("main", b"define i32 @main()").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
