//! Effective configuration with provenance
//!
//! The effective config is the typed result of merging built-in defaults,
//! the user's config file, and CLI overrides, plus a record of which
//! layers contributed.

use keydash_model::SourceId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::merge::Precedence;

/// Origin of a configuration layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    User,
    Cli,
}

/// A contributing config layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Where each source's configuration lives.
///
/// An empty string disables the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePaths {
    pub karabiner: String,
    pub aerospace: String,
    pub hammerspoon: String,
    pub rectangle: String,
}

/// Artifact output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
    /// Write `keybindings.json`
    pub json: bool,
    /// Write `keybindings-data.js`
    pub js: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub rectangle_seconds: u64,
}

/// Typed, merged configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeydashConfig {
    pub dotfiles: String,
    pub precedence: Vec<SourceId>,
    pub sources: SourcePaths,
    pub output: OutputConfig,
    pub timeouts: TimeoutConfig,
}

impl Default for KeydashConfig {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            dotfiles: defaults.dotfiles,
            precedence: defaults.precedence,
            sources: SourcePaths {
                karabiner: defaults.karabiner_path,
                aerospace: defaults.aerospace_path,
                hammerspoon: defaults.hammerspoon_path,
                rectangle: defaults.rectangle_path,
            },
            output: OutputConfig {
                dir: defaults.output_dir,
                json: defaults.write_json,
                js: defaults.write_js,
            },
            timeouts: TimeoutConfig {
                rectangle_seconds: defaults.rectangle_seconds,
            },
        }
    }
}

impl KeydashConfig {
    /// Default user config location (~/.config/keydash/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/keydash/config.toml"))
    }

    pub fn dotfiles_root(&self) -> PathBuf {
        expand_home(&self.dotfiles)
    }

    /// Resolved path for a source, or None if the source is disabled or has no file.
    pub fn source_path(&self, source: SourceId) -> Option<PathBuf> {
        let raw = match source {
            SourceId::Karabiner => &self.sources.karabiner,
            SourceId::Aerospace => &self.sources.aerospace,
            SourceId::Hammerspoon => &self.sources.hammerspoon,
            SourceId::Rectangle => &self.sources.rectangle,
            SourceId::Raycast => return None,
        };
        if raw.trim().is_empty() {
            return None;
        }
        let expanded = expand_home(raw);
        if expanded.is_absolute() {
            Some(expanded)
        } else {
            Some(self.dotfiles_root().join(expanded))
        }
    }

    /// Provenance table for the exported artifact.
    ///
    /// Every known source is listed. GUI-configured sources (Rectangle,
    /// Raycast) have no editable file and map to None.
    pub fn provenance(&self) -> BTreeMap<SourceId, Option<String>> {
        SourceId::ALL
            .into_iter()
            .map(|id| {
                let path = match id {
                    SourceId::Rectangle | SourceId::Raycast => None,
                    _ => self.source_path(id).map(|p| p.to_string_lossy().to_string()),
                };
                (id, path)
            })
            .collect()
    }

    pub fn precedence(&self) -> Result<Precedence, ConfigError> {
        Precedence::new(self.precedence.clone()).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    pub fn output_dir(&self) -> PathBuf {
        expand_home(&self.output.dir)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.precedence()?;

        // rectangle_seconds must be in (0, 60]
        let secs = self.timeouts.rectangle_seconds;
        if secs == 0 || secs > 60 {
            return Err(ConfigError::ValidationError(format!(
                "timeouts.rectangle_seconds must be in (0, 60], got {}",
                secs
            )));
        }

        if self.output.dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Effective configuration with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub config: KeydashConfig,

    /// Contributing layers in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective config from layers
    ///
    /// A missing user config file is not an error: the layer is skipped.
    pub fn build(user_config_path: Option<&Path>, cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        // Layer 1: Built-in defaults
        layers.push(BuiltinDefaults::default().to_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: User config
        if let Some(path) = user_config_path {
            if path.exists() {
                let (value, digest) = Self::load_toml_file(path)?;
                layers.push(value);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::User,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            } else {
                tracing::debug!(path = %path.display(), "no user config, using defaults");
            }
        }

        // Layer 3: CLI overrides
        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let config: KeydashConfig = serde_json::from_value(merged)
            .map_err(|e| ConfigError::ParseError(format!("invalid config: {}", e)))?;
        config.validate()?;

        Ok(Self { config, sources })
    }

    /// Build from an explicit `--config` path, or from the default location.
    ///
    /// Only the implicit default may be absent; a named file that does not
    /// exist is an error.
    pub fn load(explicit: Option<&Path>, cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::IoError(format!(
                "config file not found: {}",
                path.display()
            ))),
            Some(path) => Self::build(Some(path), cli_overrides),
            None => Self::build(KeydashConfig::default_path().as_deref(), cli_overrides),
        }
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((toml_to_json(toml_value), digest))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Convert a TOML value to a JSON value
pub(crate) fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, Value> =
                table.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect();
            Value::Object(map)
        }
    }
}

/// Expand a leading `~` to $HOME. Left untouched if HOME is unset.
pub fn expand_home(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME");
    match (path, home) {
        ("~", Some(home)) => PathBuf::from(home),
        (p, Some(home)) if p.starts_with("~/") => PathBuf::from(home).join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
