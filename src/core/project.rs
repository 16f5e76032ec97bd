//! The in-memory compilation session.

use std::path::{Component, Path, PathBuf};

use crate::backend::ModuleHandle;

/// The front-end's output for one source file.
///
/// Owns the backend handle; dropping the unit releases the generated module.
#[derive(Debug)]
pub struct CompiledUnit {
    name: String,
    source: PathBuf,
    module: Box<dyn ModuleHandle>,
}

impl CompiledUnit {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        module: Box<dyn ModuleHandle>,
    ) -> Self {
        CompiledUnit {
            name: name.into(),
            source: source.into(),
            module,
        }
    }

    /// Unit name, used to derive artifact filenames.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source file the unit was compiled from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The backend module.
    pub fn module(&self) -> &dyn ModuleHandle {
        self.module.as_ref()
    }
}

/// Derive a unit name from a source path relative to the source root:
/// `util/math.ion` becomes `util.math`.
pub fn unit_name(source_root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(source_root).unwrap_or(file);
    let relative = relative.with_extension("");

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        "unnamed".to_string()
    } else {
        parts.join(".")
    }
}

/// An ordered collection of compiled units.
#[derive(Debug, Default)]
pub struct Project {
    units: Vec<CompiledUnit>,
}

impl Project {
    pub fn new() -> Self {
        Project { units: Vec::new() }
    }

    /// Append a unit. Order of insertion is the artifact order.
    pub fn push(&mut self, unit: CompiledUnit) {
        self.units.push(unit);
    }

    pub fn units(&self) -> &[CompiledUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Find a unit by name.
    pub fn unit(&self, name: &str) -> Option<&CompiledUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Consume the project, yielding its units in order.
    pub fn into_units(self) -> Vec<CompiledUnit> {
        self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::IrModule;

    #[test]
    fn test_unit_name() {
        let root = Path::new("/proj/src");
        assert_eq!(unit_name(root, Path::new("/proj/src/main.ion")), "main");
        assert_eq!(unit_name(root, Path::new("/proj/src/util/math.ion")), "util.math");
        assert_eq!(unit_name(root, Path::new("other.ion")), "other");
    }

    #[test]
    fn test_project_preserves_order() {
        let mut project = Project::new();
        for name in ["b", "a", "c"] {
            project.push(CompiledUnit::new(
                name,
                format!("{name}.ion"),
                Box::new(IrModule::new(name, "")),
            ));
        }

        let names: Vec<_> = project.units().iter().map(|u| u.name()).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert!(project.unit("a").is_some());
        assert!(project.unit("d").is_none());
        assert_eq!(project.len(), 3);
    }
}
