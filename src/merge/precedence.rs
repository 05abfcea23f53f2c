//! Source precedence
//!
//! A fixed ranking of binding sources, highest trust first. The merge engine
//! sorts its inputs by this ranking before processing, so the order sources
//! happen to arrive in never affects which one wins a key.

use keydash_model::SourceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered list of binding sources, highest trust first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SourceId>", into = "Vec<SourceId>")]
pub struct Precedence(Vec<SourceId>);

impl Precedence {
    /// Build a precedence list, rejecting duplicates and non-binding sources.
    pub fn new(order: Vec<SourceId>) -> Result<Self, PrecedenceError> {
        if order.is_empty() {
            return Err(PrecedenceError::Empty);
        }
        for (i, source) in order.iter().enumerate() {
            if !source.produces_bindings() {
                return Err(PrecedenceError::NotBindingSource(*source));
            }
            if order[..i].contains(source) {
                return Err(PrecedenceError::Duplicate(*source));
            }
        }
        Ok(Self(order))
    }

    /// Position of a source in the ranking (0 = highest trust)
    pub fn rank(&self, source: SourceId) -> Option<usize> {
        self.0.iter().position(|s| *s == source)
    }

    pub fn contains(&self, source: SourceId) -> bool {
        self.0.contains(&source)
    }

    pub fn iter(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[SourceId] {
        &self.0
    }
}

impl Default for Precedence {
    fn default() -> Self {
        Self(SourceId::BINDING_SOURCES.to_vec())
    }
}

impl TryFrom<Vec<SourceId>> for Precedence {
    type Error = PrecedenceError;

    fn try_from(order: Vec<SourceId>) -> Result<Self, Self::Error> {
        Self::new(order)
    }
}

impl From<Precedence> for Vec<SourceId> {
    fn from(precedence: Precedence) -> Self {
        precedence.0
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|s| s.as_str()).collect();
        f.write_str(&names.join(" > "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrecedenceError {
    #[error("precedence list cannot be empty")]
    Empty,

    #[error("source '{0}' appears more than once in precedence")]
    Duplicate(SourceId),

    #[error("source '{0}' does not produce bindings and cannot be ranked")]
    NotBindingSource(SourceId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let precedence = Precedence::default();
        assert_eq!(precedence.rank(SourceId::Karabiner), Some(0));
        assert_eq!(precedence.rank(SourceId::Aerospace), Some(1));
        assert_eq!(precedence.rank(SourceId::Rectangle), Some(2));
        assert_eq!(precedence.rank(SourceId::Hammerspoon), None);
        assert_eq!(precedence.to_string(), "karabiner > aerospace > rectangle");
    }

    #[test]
    fn test_custom_order() {
        let precedence = Precedence::new(vec![SourceId::Aerospace, SourceId::Karabiner]).unwrap();
        assert_eq!(precedence.rank(SourceId::Aerospace), Some(0));
        assert!(!precedence.contains(SourceId::Rectangle));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = Precedence::new(vec![SourceId::Karabiner, SourceId::Aerospace, SourceId::Karabiner]).unwrap_err();
        assert_eq!(err, PrecedenceError::Duplicate(SourceId::Karabiner));
    }

    #[test]
    fn test_rejects_description_only_source() {
        let err = Precedence::new(vec![SourceId::Hammerspoon]).unwrap_err();
        assert_eq!(err, PrecedenceError::NotBindingSource(SourceId::Hammerspoon));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Precedence::new(vec![]).unwrap_err(), PrecedenceError::Empty);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Precedence = serde_json::from_str(r#"["rectangle","karabiner"]"#).unwrap();
        assert_eq!(ok.as_slice(), &[SourceId::Rectangle, SourceId::Karabiner]);

        let bad: Result<Precedence, _> = serde_json::from_str(r#"["aerospace","aerospace"]"#);
        assert!(bad.is_err());
    }
}
