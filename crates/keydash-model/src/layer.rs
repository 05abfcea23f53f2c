//! Layer registry
//!
//! The fixed set of logical layers. Each entry carries the metadata copied
//! verbatim into the exported artifact, plus the exact modifier sets
//! ("fingerprints") that activate it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseIdError;

/// Stable layer identifier.
///
/// Variant order is the display order of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerId {
    Hyper,
    Alt,
    AltShift,
    Service,
}

impl LayerId {
    pub const ALL: [LayerId; 4] = [
        LayerId::Hyper,
        LayerId::Alt,
        LayerId::AltShift,
        LayerId::Service,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hyper => "hyper",
            Self::Alt => "alt",
            Self::AltShift => "alt-shift",
            Self::Service => "service",
        }
    }

    /// Registry entry for this layer.
    pub fn meta(&self) -> &'static LayerMeta {
        match self {
            Self::Hyper => &LAYERS[0],
            Self::Alt => &LAYERS[1],
            Self::AltShift => &LAYERS[2],
            Self::Service => &LAYERS[3],
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseIdError::new("layer", s))
    }
}

/// Static metadata for one layer.
#[derive(Debug)]
pub struct LayerMeta {
    pub id: LayerId,
    /// Display name ("Alt+Shift").
    pub name: &'static str,
    /// Physical keys held to activate the layer.
    pub activator_keys: &'static [&'static str],
    /// CSS class hint for the dashboard.
    pub layer_class: &'static str,
    pub description: &'static str,
    /// Canonical modifier sets that activate this layer. Empty for mode-entered layers.
    pub fingerprints: &'static [&'static [&'static str]],
}

/// The registry, in display order.
pub static LAYERS: [LayerMeta; 4] = [
    LayerMeta {
        id: LayerId::Hyper,
        name: "Hyper",
        activator_keys: &["caps"],
        layer_class: "",
        description: "Caps Lock (hold) = ⌘⌃⌥⇧",
        fingerprints: &[&["command", "control", "option", "shift"]],
    },
    LayerMeta {
        id: LayerId::Alt,
        name: "Alt",
        activator_keys: &["alt"],
        layer_class: "alt-layer",
        description: "Option key bindings",
        fingerprints: &[&["option"]],
    },
    LayerMeta {
        id: LayerId::AltShift,
        name: "Alt+Shift",
        activator_keys: &["alt", "shift"],
        layer_class: "alt-layer",
        description: "Option + Shift bindings",
        fingerprints: &[&["option", "shift"]],
    },
    LayerMeta {
        id: LayerId::Service,
        name: "Service",
        activator_keys: &["caps", "semicolon"],
        layer_class: "service-layer",
        description: "Hyper+; to enter",
        fingerprints: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_lookup_matches_id() {
        for id in LayerId::ALL {
            assert_eq!(id.meta().id, id);
        }
    }

    #[test]
    fn test_layer_serializes_kebab_case() {
        let json = serde_json::to_string(&LayerId::AltShift).unwrap();
        assert_eq!(json, "\"alt-shift\"");
    }

    #[test]
    fn test_parse_layer() {
        assert_eq!("alt-shift".parse::<LayerId>().unwrap(), LayerId::AltShift);
        assert!("ctrl".parse::<LayerId>().is_err());
    }

    #[test]
    fn test_fingerprints_are_distinct() {
        let mut seen = Vec::new();
        for meta in &LAYERS {
            for fp in meta.fingerprints {
                let mut sorted: Vec<_> = fp.to_vec();
                sorted.sort_unstable();
                assert!(!seen.contains(&sorted), "duplicate fingerprint on {}", meta.name);
                seen.push(sorted);
            }
        }
    }
}
