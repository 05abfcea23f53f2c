//! Rectangle Pro adapter
//!
//! Preferences live in a binary plist. `read` converts it to an XML plist
//! through `plutil` under a deadline, falling back to decoding the file
//! in-process when `plutil` is not installed. `extract` decodes each known
//! action's `keyCode` and `modifierFlags` from that XML.

use keydash_classifier::{normalize_key, Modifier, ModifierSet};
use keydash_model::{ActionType, BindingRecord, SourceId};
use plist::Value;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

use super::{SourceAdapter, SourceBindingList, SourceError};
use crate::timeout::{run_with_timeout, CommandError};

/// Default deadline for the plist conversion
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// macOS event modifier flag bits
const MODIFIER_FLAGS: &[(u64, Modifier)] = &[
    (0x20000, Modifier::Shift),
    (0x40000, Modifier::Control),
    (0x80000, Modifier::Option),
    (0x100000, Modifier::Command),
];

/// Virtual key codes (ANSI layout) to key tokens
const KEY_CODES: &[(u64, &str)] = &[
    (0, "a"), (1, "s"), (2, "d"), (3, "f"), (4, "h"), (5, "g"), (6, "z"), (7, "x"),
    (8, "c"), (9, "v"), (11, "b"), (12, "q"), (13, "w"), (14, "e"), (15, "r"),
    (16, "y"), (17, "t"), (18, "1"), (19, "2"), (20, "3"), (21, "4"), (22, "6"),
    (23, "5"), (24, "="), (25, "9"), (26, "7"), (27, "-"), (28, "8"), (29, "0"),
    (30, "]"), (31, "o"), (32, "u"), (33, "["), (34, "i"), (35, "p"), (36, "return"),
    (37, "l"), (38, "j"), (39, "'"), (40, "k"), (41, ";"), (42, "\\"), (43, ","),
    (44, "/"), (45, "n"), (46, "m"), (47, "."), (48, "tab"), (49, "space"), (50, "`"),
    (51, "backspace"), (53, "escape"),
    (123, "left"), (124, "right"), (125, "down"), (126, "up"),
];

/// Action name → (label, description), in display order
const ACTION_LABELS: &[(&str, &str, &str)] = &[
    ("leftHalf", "Left", "Left half of screen"),
    ("rightHalf", "Right", "Right half of screen"),
    ("topHalf", "Top", "Top half of screen"),
    ("bottomHalf", "Bottom", "Bottom half of screen"),
    ("topLeft", "TL", "Top left corner"),
    ("topRight", "TR", "Top right corner"),
    ("bottomLeft", "BL", "Bottom left corner"),
    ("bottomRight", "BR", "Bottom right corner"),
    ("maximize", "Max", "Maximize window"),
    ("almostMaximize", "~Max", "Almost maximize"),
    ("center", "Center", "Center window"),
    ("centerHalf", "C 1/2", "Center half"),
    ("centerThird", "C 1/3", "Center third"),
    ("firstThird", "1/3", "First third"),
    ("lastThird", "3/3", "Last third"),
    ("firstTwoThirds", "2/3 L", "First two thirds"),
    ("lastTwoThirds", "2/3 R", "Last two thirds"),
    ("restore", "Restore", "Restore previous size"),
    ("smaller", "Shrink", "Make smaller"),
    ("larger", "Grow", "Make larger"),
    ("nextDisplay", "Next Mon", "Move to next display"),
    ("previousDisplay", "Prev Mon", "Move to previous display"),
    ("cascadeAll", "Cascade", "Cascade all windows"),
    ("cascadeApp", "Cascade App", "Cascade app windows"),
];

/// Rectangle Pro preferences adapter
#[derive(Debug, Clone)]
pub struct RectangleAdapter {
    timeout: Duration,
}

impl Default for RectangleAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECS)
    }
}

impl RectangleAdapter {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl SourceAdapter for RectangleAdapter {
    fn id(&self) -> SourceId {
        SourceId::Rectangle
    }

    fn read(&self, path: &Path) -> Result<String, SourceError> {
        let converted = run_with_timeout(
            Command::new("plutil").args(["-convert", "xml1", "-o", "-"]).arg(path),
            self.timeout,
        );
        match converted {
            Ok(stdout) => String::from_utf8(stdout).map_err(|e| SourceError::Parse(format!("plutil output: {}", e))),
            Err(CommandError::Spawn { message, .. }) => {
                debug!(%message, "plutil unavailable, decoding plist directly");
                read_plist_file(path)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn extract(&self, raw: &str) -> Result<SourceBindingList, SourceError> {
        let prefs = Value::from_reader_xml(raw.as_bytes())
            .map_err(|e| SourceError::Parse(format!("Rectangle Pro prefs: {}", e)))?;
        let prefs = prefs
            .as_dictionary()
            .ok_or_else(|| SourceError::Parse("Rectangle Pro prefs: expected a dictionary".to_string()))?;

        let mut list = SourceBindingList::new(self.id());
        for (action, label, description) in ACTION_LABELS {
            let Some(shortcut) = prefs.get(*action).and_then(Value::as_dictionary) else {
                continue;
            };
            let Some(key_code) = shortcut.get("keyCode").and_then(as_u64) else {
                continue;
            };
            let flags = shortcut.get("modifierFlags").and_then(as_u64).unwrap_or(0);

            let modifiers = decode_modifiers(flags);
            let Some(layer) = modifiers.layer() else {
                debug!(action, modifiers = %modifiers, "shortcut outside tracked layers");
                continue;
            };

            let record = BindingRecord::new(
                key_name(key_code),
                *label,
                ActionType::Position,
                *description,
                SourceId::Rectangle,
            )
            .with_raw_command(format!("rectangle-pro://execute-action?name={}", action));
            list.push(layer, record);
        }

        Ok(list)
    }
}

/// Decode a binary or XML plist file and re-encode it as XML text
fn read_plist_file(path: &Path) -> Result<String, SourceError> {
    let value = Value::from_file(path).map_err(|e| SourceError::Parse(format!("{}: {}", path.display(), e)))?;
    let mut xml = Vec::new();
    value
        .to_writer_xml(&mut xml)
        .map_err(|e| SourceError::Parse(format!("{}: {}", path.display(), e)))?;
    String::from_utf8(xml).map_err(|e| SourceError::Parse(format!("{}: {}", path.display(), e)))
}

/// Plist integers may be stored signed or unsigned
fn as_u64(value: &Value) -> Option<u64> {
    value
        .as_unsigned_integer()
        .or_else(|| value.as_signed_integer().and_then(|n| u64::try_from(n).ok()))
}

fn decode_modifiers(flags: u64) -> ModifierSet {
    let mut set = ModifierSet::new();
    for (bit, modifier) in MODIFIER_FLAGS {
        if flags & bit != 0 {
            set.insert(*modifier);
        }
    }
    set
}

fn key_name(code: u64) -> String {
    KEY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| normalize_key(name))
        .unwrap_or_else(|| format!("key{}", code))
}
