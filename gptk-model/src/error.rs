use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    EmptyKey(&'static str),
    UnknownVariant { kind: &'static str, value: String },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyKey(kind) => write!(f, "empty {kind}"),
            ModelError::UnknownVariant { kind, value } => {
                write!(f, "unknown {kind} '{value}'")
            }
        }
    }
}

impl std::error::Error for ModelError {}
