//! Key and modifier normalization.
//!
//! Every source spells keys differently (`equal_sign`, `equal`, `=`). This
//! module maps them onto one canonical alphabet and decomposes modifier
//! combos into an unordered set. Unknown key tokens are never rejected: they
//! pass through lower-cased so they stay visible in the output.

use keydash_model::{LayerId, LAYERS};
use std::collections::BTreeSet;
use std::fmt;

/// Source spellings (lower-cased) and the canonical key they map to.
const KEY_ALIASES: &[(&str, &str)] = &[
    (";", "semicolon"),
    ("'", "quote"),
    ("\\", "backslash"),
    (",", "comma"),
    (".", "period"),
    ("/", "slash"),
    ("=", "equal"),
    ("equal_sign", "equal"),
    ("-", "minus"),
    ("hyphen", "minus"),
    ("`", "grave"),
    ("backtick", "grave"),
    ("grave_accent_and_tilde", "grave"),
    ("[", "lbracket"),
    ("open_bracket", "lbracket"),
    ("leftsquarebracket", "lbracket"),
    ("]", "rbracket"),
    ("close_bracket", "rbracket"),
    ("rightsquarebracket", "rbracket"),
    ("spacebar", "space"),
    ("return_or_enter", "enter"),
    ("return", "enter"),
    ("escape", "esc"),
    ("delete_or_backspace", "backspace"),
    ("delete_forward", "delete"),
    ("left_arrow", "left"),
    ("right_arrow", "right"),
    ("up_arrow", "up"),
    ("down_arrow", "down"),
    ("leftarrow", "left"),
    ("rightarrow", "right"),
    ("uparrow", "up"),
    ("downarrow", "down"),
    ("caps_lock", "caps"),
];

/// Map a source-specific key token to the canonical alphabet.
///
/// Tokens already canonical (letters, digits, `semicolon`, ...) and unknown
/// tokens come back lower-cased.
pub fn normalize_key(token: &str) -> String {
    let trimmed = token.trim();
    // A bare space is a key, not padding.
    let lower = if trimmed.is_empty() && !token.is_empty() {
        "space".to_string()
    } else {
        trimmed.to_lowercase()
    };
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lower)
}

/// Canonical modifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Command,
    Control,
    Option,
    Shift,
    Fn,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Control => "control",
            Self::Option => "option",
            Self::Shift => "shift",
            Self::Fn => "fn",
        }
    }

    /// Parse a modifier token from any supported source spelling.
    pub fn parse(token: &str) -> Option<Self> {
        let lower = token.trim().to_lowercase();
        let base = lower
            .strip_prefix("left_")
            .or_else(|| lower.strip_prefix("right_"))
            .unwrap_or(&lower);
        match base {
            "command" | "cmd" | "⌘" => Some(Self::Command),
            "control" | "ctrl" | "⌃" => Some(Self::Control),
            "option" | "opt" | "alt" | "⌥" => Some(Self::Option),
            "shift" | "⇧" => Some(Self::Shift),
            "fn" | "function" => Some(Self::Fn),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unordered set of canonical modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet(BTreeSet<Modifier>);

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from modifier tokens.
    ///
    /// Returns `None` if any token is not a recognised modifier, so that a
    /// combo with an exotic modifier never lands on a layer by accident.
    pub fn parse<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for token in tokens {
            set.insert(Modifier::parse(token.as_ref())?);
        }
        Some(Self(set))
    }

    pub fn insert(&mut self, modifier: Modifier) {
        self.0.insert(modifier);
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0.contains(&modifier)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.0.iter().copied()
    }

    /// The layer whose registered fingerprint equals this set exactly.
    ///
    /// Subsets and supersets never match: `option` and `option+shift` are
    /// always distinct layers.
    pub fn layer(&self) -> Option<LayerId> {
        if self.is_empty() {
            return None;
        }
        LAYERS.iter().find_map(|meta| {
            meta.fingerprints
                .iter()
                .filter_map(|fp| ModifierSet::parse(fp.iter()))
                .any(|fp| fp == *self)
                .then_some(meta.id)
        })
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|m| m.as_str()).collect();
        f.write_str(&names.join("+"))
    }
}

/// A decomposed key combo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combo {
    pub modifiers: ModifierSet,
    /// Canonical key.
    pub key: String,
    /// Leading tokens that were not recognised as modifiers.
    pub unknown_modifiers: Vec<String>,
}

impl Combo {
    /// Layer for this combo, if its modifiers are all known and match a fingerprint exactly.
    pub fn layer(&self) -> Option<LayerId> {
        if self.unknown_modifiers.is_empty() {
            self.modifiers.layer()
        } else {
            None
        }
    }
}

/// Split a combo such as `alt-shift-q` into modifiers and key.
///
/// The last segment is the key; a trailing empty segment (as in `alt--`)
/// means the separator itself is the key.
pub fn parse_combo(combo: &str, separator: char) -> Combo {
    let trimmed = combo.trim();
    let mut parts: Vec<&str> = trimmed.split(separator).collect();

    let trailing_separator = parts.len() >= 2 && parts.last().is_some_and(|p| p.is_empty());
    let key = if trailing_separator {
        parts.truncate(parts.len() - 2);
        separator.to_string()
    } else {
        parts.pop().unwrap_or_default().to_string()
    };

    let mut modifiers = ModifierSet::new();
    let mut unknown_modifiers = Vec::new();
    for part in parts.into_iter().filter(|p| !p.is_empty()) {
        match Modifier::parse(part) {
            Some(m) => modifiers.insert(m),
            None => unknown_modifiers.push(part.to_lowercase()),
        }
    }

    Combo {
        modifiers,
        key: normalize_key(&key),
        unknown_modifiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation_is_spelled_out() {
        assert_eq!(normalize_key(";"), "semicolon");
        assert_eq!(normalize_key("equal_sign"), "equal");
        assert_eq!(normalize_key("grave_accent_and_tilde"), "grave");
        assert_eq!(normalize_key("leftSquareBracket"), "lbracket");
        assert_eq!(normalize_key("spacebar"), "space");
    }

    #[test]
    fn test_normalize_unknown_passes_through_lowercased() {
        assert_eq!(normalize_key("Q"), "q");
        assert_eq!(normalize_key("keypad_5"), "keypad_5");
        assert_eq!(normalize_key("F13"), "f13");
    }

    #[test]
    fn test_modifier_aliases() {
        assert_eq!(Modifier::parse("alt"), Some(Modifier::Option));
        assert_eq!(Modifier::parse("left_option"), Some(Modifier::Option));
        assert_eq!(Modifier::parse("Cmd"), Some(Modifier::Command));
        assert_eq!(Modifier::parse("caps_lock"), None);
    }

    #[test]
    fn test_layer_match_is_exact() {
        let alt = ModifierSet::parse(["option"]).unwrap();
        let alt_shift = ModifierSet::parse(["shift", "alt"]).unwrap();
        let ctrl_alt_shift = ModifierSet::parse(["ctrl", "alt", "shift"]).unwrap();
        let hyper = ModifierSet::parse(["command", "control", "option", "shift"]).unwrap();

        assert_eq!(alt.layer(), Some(LayerId::Alt));
        assert_eq!(alt_shift.layer(), Some(LayerId::AltShift));
        assert_eq!(ctrl_alt_shift.layer(), None);
        assert_eq!(hyper.layer(), Some(LayerId::Hyper));
        assert_eq!(ModifierSet::new().layer(), None);
    }

    #[test]
    fn test_parse_combo() {
        let combo = parse_combo("alt-shift-semicolon", '-');
        assert_eq!(combo.key, "semicolon");
        assert_eq!(combo.layer(), Some(LayerId::AltShift));

        let combo = parse_combo("cmd-q", '-');
        assert_eq!(combo.key, "q");
        assert_eq!(combo.layer(), None);
    }

    #[test]
    fn test_parse_combo_separator_as_key() {
        let combo = parse_combo("alt--", '-');
        assert_eq!(combo.key, "minus");
        assert_eq!(combo.layer(), Some(LayerId::Alt));
    }

    #[test]
    fn test_parse_combo_unknown_modifier_blocks_layer() {
        let combo = parse_combo("hyper-alt-q", '-');
        assert_eq!(combo.unknown_modifiers, vec!["hyper".to_string()]);
        assert_eq!(combo.layer(), None);
    }
}
