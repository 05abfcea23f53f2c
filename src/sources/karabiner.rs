//! Karabiner-Elements adapter
//!
//! Reads the first profile's `complex_modifications` rules. A manipulator
//! belongs to a layer when its mandatory modifiers equal a layer fingerprint
//! exactly, or when it is gated on a layer variable (`hyper = 1`).

use keydash_classifier::{karabiner_rules, normalize_key, ModifierSet, RuleInput, RuleSet};
use keydash_model::{BindingRecord, LayerId, SourceId};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{SourceAdapter, SourceBindingList, SourceError};

/// Variables whose `variable_if` selects a layer
const LAYER_VARIABLES: &[(&str, &str, LayerId)] = &[("hyper", "1", LayerId::Hyper)];

#[derive(Debug, Deserialize)]
struct KarabinerConfig {
    #[serde(default, deserialize_with = "nullable")]
    profiles: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    complex_modifications: Option<ComplexModifications>,
}

/// Rules and manipulators stay raw so one odd entry only drops itself
#[derive(Debug, Deserialize)]
struct ComplexModifications {
    #[serde(default, deserialize_with = "nullable")]
    rules: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Rule {
    #[serde(default, deserialize_with = "nullable")]
    description: String,
    #[serde(default, deserialize_with = "nullable")]
    manipulators: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Manipulator {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    kind: String,
    #[serde(default, deserialize_with = "nullable")]
    from: FromEvent,
    #[serde(default, deserialize_with = "nullable")]
    to: Vec<ToEvent>,
    #[serde(default, deserialize_with = "nullable")]
    conditions: Vec<Condition>,
}

#[derive(Debug, Default, Deserialize)]
struct FromEvent {
    key_code: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    modifiers: FromModifiers,
}

#[derive(Debug, Default, Deserialize)]
struct FromModifiers {
    #[serde(default, deserialize_with = "nullable")]
    mandatory: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ToEvent {
    shell_command: Option<String>,
    key_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    kind: String,
    name: Option<String>,
    value: Option<Value>,
}

/// Treat an explicit `null` like a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Condition {
    fn variable(&self) -> Option<(&str, String)> {
        let name = self.name.as_deref()?;
        let value = match self.value.as_ref()? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Some((name, value))
    }
}

/// Action a manipulator emits
#[derive(Clone, Copy)]
enum Action<'a> {
    Shell(&'a str),
    Key(&'a str),
}

/// Karabiner-Elements `karabiner.json` adapter
pub struct KarabinerAdapter {
    rules: RuleSet,
}

impl Default for KarabinerAdapter {
    fn default() -> Self {
        Self {
            rules: karabiner_rules(),
        }
    }
}

impl KarabinerAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SourceAdapter for KarabinerAdapter {
    fn id(&self) -> SourceId {
        SourceId::Karabiner
    }

    fn extract(&self, raw: &str) -> Result<SourceBindingList, SourceError> {
        let config: KarabinerConfig =
            serde_json::from_str(raw).map_err(|e| SourceError::Parse(format!("karabiner.json: {}", e)))?;

        let mut list = SourceBindingList::new(self.id());
        let Some(rules) = config
            .profiles
            .into_iter()
            .next()
            .and_then(|p| p.complex_modifications)
            .map(|cm| cm.rules)
        else {
            debug!("no complex_modifications in first profile");
            return Ok(list);
        };

        for (index, raw_rule) in rules.iter().enumerate() {
            let rule = match Rule::deserialize(raw_rule) {
                Ok(rule) => rule,
                Err(e) => {
                    debug!(index, "skipping malformed rule: {}", e);
                    continue;
                }
            };
            for raw_manipulator in &rule.manipulators {
                let manipulator = match Manipulator::deserialize(raw_manipulator) {
                    Ok(m) => m,
                    Err(e) => {
                        debug!(rule = rule.description.as_str(), "skipping malformed manipulator: {}", e);
                        continue;
                    }
                };
                if let Some((layer, record)) = self.manipulator_binding(&rule.description, &manipulator) {
                    list.push(layer, record);
                }
            }
        }

        Ok(list)
    }
}

impl KarabinerAdapter {
    fn manipulator_binding(&self, rule_description: &str, manipulator: &Manipulator) -> Option<(LayerId, BindingRecord)> {
        if manipulator.kind != "basic" {
            return None;
        }
        let key_code = manipulator.from.key_code.as_deref()?;

        let (layer, selector) = layer_of(manipulator)?;

        let action = manipulator.to.iter().find_map(|to| {
            to.shell_command
                .as_deref()
                .map(Action::Shell)
                .or_else(|| to.key_code.as_deref().map(Action::Key))
        })?;
        let command = match action {
            Action::Shell(cmd) | Action::Key(cmd) => cmd,
        };

        let key = normalize_key(key_code);
        let description_hint = if rule_description.is_empty() {
            command
        } else {
            rule_description
        };
        let input = RuleInput::new(&key, command).with_hints(command, description_hint);
        let classification = self.rules.classify(&input);

        let mut record = BindingRecord::new(
            key.clone(),
            classification.action_label,
            classification.action_type,
            classification.description,
            SourceId::Karabiner,
        );
        if let Action::Shell(cmd) = action {
            record = record.with_raw_command(cmd);
        }
        if let Some(condition) = condition_of(manipulator, selector) {
            record = record.with_condition(condition);
        }

        Some((layer, record))
    }
}

/// Layer of a manipulator, plus the variable that selected it (if any)
fn layer_of(manipulator: &Manipulator) -> Option<(LayerId, Option<&str>)> {
    let by_modifiers = ModifierSet::parse(&manipulator.from.modifiers.mandatory).and_then(|m| m.layer());
    if let Some(layer) = by_modifiers {
        return Some((layer, None));
    }

    manipulator
        .conditions
        .iter()
        .filter(|c| c.kind == "variable_if")
        .find_map(|c| {
            let (name, value) = c.variable()?;
            LAYER_VARIABLES
                .iter()
                .find(|(n, v, _)| *n == name && *v == value)
                .map(|(n, _, layer)| (*layer, Some(*n)))
        })
}

/// Runtime predicate from variable conditions, excluding the layer selector
fn condition_of(manipulator: &Manipulator, selector: Option<&str>) -> Option<String> {
    let parts: Vec<String> = manipulator
        .conditions
        .iter()
        .filter_map(|c| {
            let negate = match c.kind.as_str() {
                "variable_if" => false,
                "variable_unless" => true,
                _ => return None,
            };
            let (name, value) = c.variable()?;
            if !negate && Some(name) == selector {
                return None;
            }
            Some(if negate {
                format!("!{}={}", name, value)
            } else {
                format!("{}={}", name, value)
            })
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join(" && "))
}
