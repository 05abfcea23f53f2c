//! Source identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseIdError;

/// A configuration source that can contribute or describe bindings.
///
/// Declaration order is the default precedence: a hardware remapper fires
/// before the window manager, which fires before app-level tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Karabiner,
    Aerospace,
    Rectangle,
    Hammerspoon,
    Raycast,
}

impl SourceId {
    /// Every known source, in default precedence order.
    pub const ALL: [SourceId; 5] = [
        SourceId::Karabiner,
        SourceId::Aerospace,
        SourceId::Rectangle,
        SourceId::Hammerspoon,
        SourceId::Raycast,
    ];

    /// Sources that produce binding records (the rest only describe or are GUI-only).
    pub const BINDING_SOURCES: [SourceId; 3] =
        [SourceId::Karabiner, SourceId::Aerospace, SourceId::Rectangle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Karabiner => "karabiner",
            Self::Aerospace => "aerospace",
            Self::Rectangle => "rectangle",
            Self::Hammerspoon => "hammerspoon",
            Self::Raycast => "raycast",
        }
    }

    /// Human-readable name for progress output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Karabiner => "Karabiner",
            Self::Aerospace => "AeroSpace",
            Self::Rectangle => "Rectangle Pro",
            Self::Hammerspoon => "Hammerspoon cheatsheet",
            Self::Raycast => "Raycast",
        }
    }

    /// Whether this source contributes binding records to the merge.
    pub fn produces_bindings(&self) -> bool {
        Self::BINDING_SOURCES.contains(self)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseIdError::new("source", s))
    }
}
