//! Language front-end.
//!
//! The driver only depends on the [`Frontend`] trait. [`IonFrontend`] is the
//! reference implementation: it lexes, parses and lowers one `.ion` file to an
//! LLVM IR module.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

use std::path::Path;

pub use error::{FrontendError, Pos};

use crate::backend::IrModule;
use crate::core::project::{unit_name, CompiledUnit};

/// Compiles one source file into a unit. Implementations are shared across
/// compile workers.
pub trait Frontend: Send + Sync {
    fn compile(&self, source_root: &Path, file: &Path) -> Result<CompiledUnit, FrontendError>;
}

/// The reference Ion front-end.
#[derive(Debug, Default, Clone, Copy)]
pub struct IonFrontend;

impl IonFrontend {
    pub fn new() -> Self {
        IonFrontend
    }
}

impl Frontend for IonFrontend {
    fn compile(&self, source_root: &Path, file: &Path) -> Result<CompiledUnit, FrontendError> {
        let source = std::fs::read_to_string(file)?;
        let name = unit_name(source_root, file);
        let source_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());

        let module = compile_source(&name, &source_name, &source)?;
        Ok(CompiledUnit::new(name, file, Box::new(module)))
    }
}

/// Compile source text into an IR module.
pub fn compile_source(
    module_name: &str,
    source_name: &str,
    source: &str,
) -> Result<IrModule, FrontendError> {
    let tokens = lexer::lex(source)?;
    let file = parser::parse(tokens)?;
    let text = codegen::generate(module_name, source_name, &file)?;
    Ok(IrModule::new(module_name, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compile_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("util");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("math.ion");
        std::fs::write(&file, "fn square(x: i32) -> i32 { return x * x; }\n").unwrap();

        let unit = IonFrontend::new().compile(tmp.path(), &file).unwrap();
        assert_eq!(unit.name(), "util.math");
        assert_eq!(unit.source(), file.as_path());
        assert_eq!(unit.module().identifier(), "util.math");
    }

    #[test]
    fn test_compile_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = IonFrontend::new()
            .compile(tmp.path(), &tmp.path().join("missing.ion"))
            .unwrap_err();
        assert!(matches!(err, FrontendError::Io(_)));
    }

    #[test]
    fn test_compile_source_text() {
        let module = compile_source("main", "main.ion", "fn main() -> i32 { return 0; }").unwrap();
        assert!(module.text().contains("define i32 @main()"));
    }
}
