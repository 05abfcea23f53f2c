//! Binding records
//!
//! `BindingRecord` is what an adapter emits for one source entry.
//! `MergedBinding` is the single dashboard cell for a key within a layer,
//! optionally carrying the conditional variants that share the key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseIdError;
use crate::source::SourceId;

/// Closed category set; drives icon selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Workspace,
    Focus,
    Position,
    Resize,
    Mode,
    System,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Focus => "focus",
            Self::Position => "position",
            Self::Resize => "resize",
            Self::Mode => "mode",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "workspace" => Ok(Self::Workspace),
            "focus" => Ok(Self::Focus),
            "position" => Ok(Self::Position),
            "resize" => Ok(Self::Resize),
            "mode" => Ok(Self::Mode),
            "system" => Ok(Self::System),
            _ => Err(ParseIdError::new("action type", s)),
        }
    }
}

/// One candidate shortcut from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingRecord {
    /// Canonical key token (`q`, `semicolon`, `left`).
    pub key: String,
    pub action_label: String,
    pub action_type: ActionType,
    pub description: String,
    pub source: SourceId,
    #[serde(default)]
    pub raw_command: Option<String>,
    /// Runtime predicate such as `tilingEnabled=1`. Present means conditional.
    #[serde(default)]
    pub condition: Option<String>,
}

impl BindingRecord {
    pub fn new(
        key: impl Into<String>,
        action_label: impl Into<String>,
        action_type: ActionType,
        description: impl Into<String>,
        source: SourceId,
    ) -> Self {
        Self {
            key: key.into(),
            action_label: action_label.into(),
            action_type,
            description: description.into(),
            source,
            raw_command: None,
            condition: None,
        }
    }

    pub fn with_raw_command(mut self, raw: impl Into<String>) -> Self {
        self.raw_command = Some(raw.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

/// Icon family shown in a dashboard cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    Ws,
    Pos,
    Focus,
    Mode,
    Resize,
    Sys,
}

/// Icon descriptor: a kind plus an optional datum (workspace number, arrow glyph, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub kind: IconKind,
    pub data: Option<String>,
}

impl Icon {
    pub fn new(kind: IconKind) -> Self {
        Self { kind, data: None }
    }

    pub fn with_data(kind: IconKind, data: impl Into<String>) -> Self {
        Self {
            kind,
            data: Some(data.into()),
        }
    }
}

/// A conditional alternative for a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub condition: String,
    pub action_label: String,
    pub action_type: ActionType,
    pub description: String,
    pub raw_command: Option<String>,
}

/// The dashboard-facing unit for one key within one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedBinding {
    pub key: String,
    pub action_label: String,
    pub action_type: ActionType,
    pub description: String,
    pub source: SourceId,
    pub raw_command: Option<String>,
    pub icon: Icon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<Variant>>,
}

impl MergedBinding {
    /// Build the default display for a key from a record and its resolved
    /// description and icon.
    pub fn from_record(record: &BindingRecord, description: String, icon: Icon) -> Self {
        Self {
            key: record.key.clone(),
            action_label: record.action_label.clone(),
            action_type: record.action_type,
            description,
            source: record.source,
            raw_command: record.raw_command.clone(),
            icon,
            variants: None,
        }
    }

    pub fn has_variants(&self) -> bool {
        self.variants.as_ref().is_some_and(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_serializes_camel_case() {
        let record = BindingRecord::new("w", "WS 3", ActionType::Workspace, "Workspace 3", SourceId::Karabiner)
            .with_raw_command("aerospace summon-workspace 3");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["actionLabel"], "WS 3");
        assert_eq!(value["actionType"], "workspace");
        assert_eq!(value["rawCommand"], "aerospace summon-workspace 3");
        assert!(value["condition"].is_null());
    }

    #[test]
    fn test_merged_binding_omits_absent_variants() {
        let record = BindingRecord::new("q", "Close", ActionType::System, "Close", SourceId::Aerospace);
        let merged = MergedBinding::from_record(&record, "Close window".into(), Icon::new(IconKind::Sys));
        let value = serde_json::to_value(&merged).unwrap();
        assert!(value.get("variants").is_none());
        assert_eq!(value["icon"], json!({"kind": "sys", "data": null}));
        assert_eq!(value["description"], "Close window");
    }

    #[test]
    fn test_action_type_parse() {
        assert_eq!("Resize".parse::<ActionType>().unwrap(), ActionType::Resize);
        assert!("launch".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_record_is_conditional() {
        let base = BindingRecord::new("f", "Float", ActionType::Mode, "", SourceId::Karabiner);
        assert!(!base.is_conditional());
        assert!(base.with_condition("tiling=1").is_conditional());
    }
}
