//! Error types for identifier parsing.

/// Raised when a string does not name a known layer, source or action type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseIdError {
    /// What was being parsed ("layer", "source", "action type").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseIdError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
