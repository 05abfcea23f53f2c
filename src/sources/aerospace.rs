//! AeroSpace adapter
//!
//! `[mode.main.binding]` combos map to layers by exact modifier fingerprint.
//! `[mode.service.binding]` keys are plain and all land on the service layer.

use keydash_classifier::{aerospace_rules, aerospace_service_rules, normalize_key, parse_combo, RuleInput, RuleSet};
use keydash_model::{BindingRecord, LayerId, SourceId};
use tracing::debug;

use super::{SourceAdapter, SourceBindingList, SourceError};

const COMMAND_JOINER: &str = " && ";

/// AeroSpace `aerospace.toml` adapter
pub struct AerospaceAdapter {
    main_rules: RuleSet,
    service_rules: RuleSet,
}

impl Default for AerospaceAdapter {
    fn default() -> Self {
        Self {
            main_rules: aerospace_rules(),
            service_rules: aerospace_service_rules(),
        }
    }
}

impl AerospaceAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, key: String, commands: &[String], service: bool) -> BindingRecord {
        let joined = commands.join(COMMAND_JOINER);
        let first = commands.first().map(String::as_str).unwrap_or_default();
        let description_hint = commands.join(" + ");

        let rules = if service { &self.service_rules } else { &self.main_rules };
        let input = RuleInput::new(&key, &joined).with_hints(first, &description_hint);
        let classification = rules.classify(&input);

        BindingRecord::new(
            key,
            classification.action_label,
            classification.action_type,
            classification.description,
            SourceId::Aerospace,
        )
        .with_raw_command(joined)
    }
}

impl SourceAdapter for AerospaceAdapter {
    fn id(&self) -> SourceId {
        SourceId::Aerospace
    }

    fn extract(&self, raw: &str) -> Result<SourceBindingList, SourceError> {
        let config: toml::Value =
            toml::from_str(raw).map_err(|e| SourceError::Parse(format!("aerospace.toml: {}", e)))?;

        let mut list = SourceBindingList::new(self.id());

        for (combo, value) in mode_bindings(&config, "main") {
            let Some(commands) = commands_of(value) else {
                debug!(combo, "skipping non-command binding");
                continue;
            };
            let parsed = parse_combo(combo, '-');
            match parsed.layer() {
                Some(layer) => list.push(layer, self.record(parsed.key, &commands, false)),
                None => debug!(combo, "combo outside tracked layers"),
            }
        }

        for (combo, value) in mode_bindings(&config, "service") {
            let Some(commands) = commands_of(value) else {
                debug!(combo, "skipping non-command binding");
                continue;
            };
            list.push(LayerId::Service, self.record(service_key(combo), &commands, true));
        }

        Ok(list)
    }
}

/// `mode.<name>.binding` table entries, in file order
fn mode_bindings<'a>(config: &'a toml::Value, mode: &str) -> Vec<(&'a str, &'a toml::Value)> {
    config
        .get("mode")
        .and_then(|m| m.get(mode))
        .and_then(|m| m.get("binding"))
        .and_then(toml::Value::as_table)
        .map(|table| table.iter().map(|(k, v)| (k.as_str(), v)).collect())
        .unwrap_or_default()
}

/// A binding value is a single command or a list run in sequence
fn commands_of(value: &toml::Value) -> Option<Vec<String>> {
    match value {
        toml::Value::String(s) => Some(vec![s.clone()]),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

/// Service keys are plain; combos that still carry modifiers are kept verbatim
fn service_key(combo: &str) -> String {
    let parsed = parse_combo(combo, '-');
    if parsed.modifiers.is_empty() && parsed.unknown_modifiers.is_empty() {
        parsed.key
    } else {
        normalize_key(combo)
    }
}
