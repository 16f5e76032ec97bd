use std::fmt;

use thiserror::Error;

/// A position in a source file, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(line: u32, column: u32) -> Self {
        Pos { line, column }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("{pos}: {message}")]
    Syntax { pos: Pos, message: String },

    #[error("{pos}: {message}")]
    Semantic { pos: Pos, message: String },
}

impl FrontendError {
    pub fn syntax(pos: Pos, message: impl Into<String>) -> Self {
        FrontendError::Syntax {
            pos,
            message: message.into(),
        }
    }

    pub fn semantic(pos: Pos, message: impl Into<String>) -> Self {
        FrontendError::Semantic {
            pos,
            message: message.into(),
        }
    }

    /// Source position, when the error has one.
    pub fn pos(&self) -> Option<Pos> {
        match self {
            FrontendError::Io(_) => None,
            FrontendError::Syntax { pos, .. } | FrontendError::Semantic { pos, .. } => Some(*pos),
        }
    }
}
