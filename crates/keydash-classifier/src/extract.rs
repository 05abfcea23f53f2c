//! Numeric and direction extraction from raw command strings.
//!
//! All extractors are first-match-wins. Numeric extractors that find nothing
//! yield the `?` placeholder instead of failing the record.

use keydash_model::UNKNOWN_MARKER;
use regex_lite::Regex;
use std::sync::OnceLock;

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("digits pattern is valid"))
}

fn signed_delta_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[+-]\d+").expect("signed delta pattern is valid"))
}

/// First run of digits anywhere in `text`.
pub fn first_number(text: &str) -> Option<&str> {
    digits_re().find(text).map(|m| m.as_str())
}

/// Workspace number from a raw command, or `?`.
///
/// `"move-node-to-workspace 7"` yields `"7"`.
pub fn workspace_number(text: &str) -> String {
    first_number(text).unwrap_or(UNKNOWN_MARKER).to_string()
}

/// Number that directly follows `verb` (after whitespace), at the first
/// occurrence of `verb` that has one. Case-insensitive on `verb`.
pub fn number_after(text: &str, verb: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let verb = verb.to_lowercase();
    lower.match_indices(&verb).find_map(|(idx, _)| {
        let rest = &lower[idx + verb.len()..];
        let after_ws = rest.trim_start();
        if after_ws.len() == rest.len() {
            // verb must be followed by whitespace
            return None;
        }
        let digits: String = after_ws.chars().take_while(|c| c.is_ascii_digit()).collect();
        (!digits.is_empty()).then_some(digits)
    })
}

/// Like [`number_after`], but yields `?` when absent.
pub fn number_after_or_marker(text: &str, verb: &str) -> String {
    number_after(text, verb).unwrap_or_else(|| UNKNOWN_MARKER.to_string())
}

/// First signed resize delta (`+50`, `-100`), or `?`.
pub fn signed_delta(text: &str) -> String {
    signed_delta_re()
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_MARKER.to_string())
}

/// Focus/move direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Left => "◂",
            Self::Right => "▸",
            Self::Up => "▴",
            Self::Down => "▾",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "left" | "prev" | "previous" | "l" => Some(Self::Left),
            "right" | "next" | "r" => Some(Self::Right),
            "up" | "u" => Some(Self::Up),
            "down" | "d" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Direction named by a whole word in `text` (`focus left`, `Foc L`, `dfs-prev`).
///
/// Matches words, not letters, so `close-all-windows` is not read as "left".
pub fn direction(text: &str) -> Option<Direction> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .find_map(Direction::from_word)
}
