//! Built-in defaults (layer 1)
//!
//! Hardcoded defaults for all configuration values. Source paths are
//! relative to the dotfiles root unless absolute or `~`-prefixed.

use keydash_model::SourceId;
use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Dotfiles checkout all relative source paths resolve against
    pub dotfiles: String,

    /// Source precedence, highest trust first
    pub precedence: Vec<SourceId>,

    pub karabiner_path: String,
    pub aerospace_path: String,
    pub hammerspoon_path: String,
    pub rectangle_path: String,

    /// Output directory for generated artifacts (default: "templates")
    pub output_dir: String,
    pub write_json: bool,
    pub write_js: bool,

    /// Timeout for reading Rectangle Pro preferences (default: 5)
    pub rectangle_seconds: u64,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            dotfiles: "~/Dev/dotfiles".to_string(),
            precedence: vec![SourceId::Karabiner, SourceId::Aerospace, SourceId::Rectangle],
            karabiner_path: ".config/karabiner/karabiner.json".to_string(),
            aerospace_path: ".config/aerospace/aerospace.toml".to_string(),
            hammerspoon_path: "hammerspoon/cheatsheet.lua".to_string(),
            rectangle_path: "~/Library/Preferences/com.knollsoft.Rectangle-Pro.plist".to_string(),
            output_dir: "templates".to_string(),
            write_json: true,
            write_js: true,
            rectangle_seconds: 5,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "dotfiles": self.dotfiles,
            "precedence": self.precedence,
            "sources": {
                "karabiner": self.karabiner_path,
                "aerospace": self.aerospace_path,
                "hammerspoon": self.hammerspoon_path,
                "rectangle": self.rectangle_path
            },
            "output": {
                "dir": self.output_dir,
                "json": self.write_json,
                "js": self.write_js
            },
            "timeouts": {
                "rectangle_seconds": self.rectangle_seconds
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.rectangle_seconds, 5);
        assert_eq!(defaults.precedence[0], SourceId::Karabiner);
        assert!(defaults.write_js);
    }

    #[test]
    fn test_to_value_shape() {
        let value = BuiltinDefaults::default().to_value();
        assert_eq!(value["precedence"][1], "aerospace");
        assert_eq!(value["sources"]["hammerspoon"], "hammerspoon/cheatsheet.lua");
        assert_eq!(value["output"]["dir"], "templates");
        assert_eq!(value["timeouts"]["rectangle_seconds"], 5);
    }
}
