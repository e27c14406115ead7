//! Error types for name parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or validating names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name string is empty.
    #[error("{kind} name cannot be empty")]
    Empty { kind: &'static str },

    /// The name has leading or trailing whitespace.
    #[error("{kind} name '{value}' has surrounding whitespace")]
    SurroundingWhitespace { kind: &'static str, value: String },

    /// The name contains a control character.
    #[error("{kind} name '{value}' contains a control character")]
    ControlCharacter { kind: &'static str, value: String },
}

impl NameError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, NameError::Empty { .. })
    }

    /// The kind of name that failed validation.
    pub fn kind(&self) -> &'static str {
        match self {
            NameError::Empty { kind }
            | NameError::SurroundingWhitespace { kind, .. }
            | NameError::ControlCharacter { kind, .. } => kind,
        }
    }
}
