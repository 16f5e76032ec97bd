//! Requested operations and their resolution.

use std::fmt;

/// The operation named on the command line, as resolved from its string form.
///
/// `Unknown` only exists so that resolution itself is total; the driver
/// converts an `OperationType` into an [`Operation`] immediately and aborts if
/// it is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Init,
    Build,
    Run,
    Unknown,
}

impl OperationType {
    /// Resolve an operation name. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    pub fn resolve(value: &str) -> OperationType {
        match value.trim().to_ascii_lowercase().as_str() {
            "init" => OperationType::Init,
            "build" => OperationType::Build,
            "run" => OperationType::Run,
            _ => OperationType::Unknown,
        }
    }
}

/// A validated operation. Unknown operations are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Init,
    Build,
    Run,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Build => "build",
            Operation::Run => "run",
        }
    }

    /// Whether this operation needs a package manifest and a compiled project.
    pub fn needs_project(&self) -> bool {
        !matches!(self, Operation::Init)
    }
}

impl TryFrom<OperationType> for Operation {
    type Error = OperationType;

    fn try_from(value: OperationType) -> Result<Self, Self::Error> {
        match value {
            OperationType::Init => Ok(Operation::Init),
            OperationType::Build => Ok(Operation::Build),
            OperationType::Run => Ok(Operation::Run),
            OperationType::Unknown => Err(value),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_operations() {
        assert_eq!(OperationType::resolve("init"), OperationType::Init);
        assert_eq!(OperationType::resolve("build"), OperationType::Build);
        assert_eq!(OperationType::resolve("run"), OperationType::Run);
        assert_eq!(OperationType::resolve(" Build "), OperationType::Build);
    }

    #[test]
    fn test_resolve_unknown_operations() {
        for value in ["", "compile", "runn", "init build", "-r"] {
            assert_eq!(OperationType::resolve(value), OperationType::Unknown, "{value:?}");
        }
    }

    #[test]
    fn test_operation_conversion() {
        assert_eq!(Operation::try_from(OperationType::Run), Ok(Operation::Run));
        assert!(Operation::try_from(OperationType::Unknown).is_err());
        assert!(!Operation::Init.needs_project());
        assert!(Operation::Build.needs_project());
        assert_eq!(Operation::Build.to_string(), "build");
    }
}
