//! Hammerspoon cheatsheet
//!
//! `cheatsheet.lua` holds hand-written descriptions in blocks of the form
//! `{ title = "HYPER", items = { {"W", "Browser workspace"}, ... } }`.
//! It contributes no bindings; it only enriches descriptions.

use keydash_classifier::normalize_key;
use keydash_model::LayerId;
use regex_lite::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use super::SourceError;
use crate::merge::DescriptionLookup;

fn section_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\{\s*title\s*=\s*["']([^"']+)["']\s*,\s*items\s*=\s*\{"#).unwrap())
}

fn item_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\{\s*["']([^"']+)["']\s*,\s*["']([^"']+)["']\s*\}"#).unwrap())
}

/// One `{key, description}` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheatsheetItem {
    /// Key as written, possibly a range such as `Q-P`
    pub key: String,
    pub description: String,
}

impl CheatsheetItem {
    /// Whether this item describes `key`.
    ///
    /// A three-character `a-b` token is an inclusive range over single
    /// characters; anything else compares as a canonical key.
    fn matches(&self, key: &str) -> bool {
        let stored: Vec<char> = self.key.to_lowercase().chars().collect();
        let wanted = key.trim().to_lowercase();
        let mut wanted_chars = wanted.chars();

        if let &[start, '-', end] = stored.as_slice() {
            return match (wanted_chars.next(), wanted_chars.next()) {
                (Some(c), None) => start <= c && c <= end,
                _ => false,
            };
        }
        normalize_key(&self.key) == normalize_key(key)
    }
}

/// Map a cheatsheet section title to a layer id or a slug.
///
/// More specific titles are checked first so `ALT+SHIFT` is not read as `ALT`.
pub fn normalize_section_title(title: &str) -> String {
    let lower = title.to_lowercase();
    if lower.contains("service") {
        return LayerId::Service.as_str().to_string();
    }
    if lower.contains("hammerspoon") {
        return "hammerspoon".to_string();
    }
    if lower.contains("raycast") {
        return "raycast".to_string();
    }
    if lower.contains("alt+shift") || lower.contains("alt-shift") || title.contains("⌥⇧") {
        return LayerId::AltShift.as_str().to_string();
    }
    if lower.contains("alt") || title.contains('⌥') {
        return LayerId::Alt.as_str().to_string();
    }
    if lower.contains("hyper") {
        return LayerId::Hyper.as_str().to_string();
    }
    lower.trim().replace(' ', "-")
}

/// Parsed cheatsheet: section id → items in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cheatsheet {
    sections: BTreeMap<String, Vec<CheatsheetItem>>,
}

impl Cheatsheet {
    /// Parse cheatsheet text. Unrecognised content is ignored.
    pub fn parse(raw: &str) -> Self {
        let mut sections: BTreeMap<String, Vec<CheatsheetItem>> = BTreeMap::new();

        for caps in section_start().captures_iter(raw) {
            let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(block) = items_block(&raw[whole.end()..]) else {
                debug!(title = title.as_str(), "unterminated items block");
                continue;
            };

            let items = item_pattern().captures_iter(block).filter_map(|item| {
                Some(CheatsheetItem {
                    key: item.get(1)?.as_str().to_string(),
                    description: item.get(2)?.as_str().to_string(),
                })
            });

            // Repeated titles (several HYPER blocks) concatenate
            sections
                .entry(normalize_section_title(title.as_str()))
                .or_default()
                .extend(items);
        }

        Self { sections }
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::parse(&raw))
    }

    /// Load, degrading any failure to an empty cheatsheet
    pub fn load_or_empty(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        info!("Parsing Hammerspoon cheatsheet...");
        match Self::load(path) {
            Ok(sheet) => {
                info!("  {} sections, {} entries", sheet.sections.len(), sheet.len());
                sheet
            }
            Err(e) => {
                warn!(path = %path.display(), "cheatsheet unavailable: {}", e);
                Self::default()
            }
        }
    }

    pub fn section(&self, id: &str) -> &[CheatsheetItem] {
        self.sections.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.keys().map(String::as_str)
    }

    /// Total entries across sections
    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First description in `section` that covers `key`
    pub fn describe(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)
            .iter()
            .find(|item| item.matches(key))
            .map(|item| item.description.as_str())
    }
}

impl DescriptionLookup for Cheatsheet {
    fn lookup(&self, layer: LayerId, key: &str) -> Option<String> {
        self.describe(layer.as_str(), key).map(str::to_string)
    }
}

/// Text of an `items = { ... }` block, given the text right after its opening brace
fn items_block(rest: &str) -> Option<&str> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in rest.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..idx]);
                }
            }
            _ => {}
        }
    }
    None
}
