//! Key normalization and action classification for keydash.
//!
//! Adapters use this crate to turn source-specific key tokens into the
//! canonical alphabet, to decide which layer a modifier combo belongs to,
//! and to derive `(label, type, description)` from raw commands through
//! ordered first-match-wins rule lists.

pub mod extract;
pub mod icon;
pub mod keys;
pub mod rules;

pub use extract::{direction, signed_delta, workspace_number, Direction};
pub use icon::derive_icon;
pub use keys::{normalize_key, parse_combo, Combo, Modifier, ModifierSet};
pub use rules::{
    aerospace_rules, aerospace_service_rules, karabiner_rules, Classification, Explanation, Rule,
    RuleInput, RuleSet,
};
