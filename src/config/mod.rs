//! Configuration merge system
//!
//! Implements the 3-layer configuration merge:
//! 1. Built-in defaults
//! 2. User config (~/.config/keydash/config.toml)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    expand_home, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, KeydashConfig, OutputConfig,
    SourcePaths, TimeoutConfig,
};
pub use merge::{deep_merge, merge_layers};
