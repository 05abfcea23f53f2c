//! Ordered pattern rules
//!
//! A `RuleSet` is an explicit list of `(predicate, builder)` pairs evaluated
//! top to bottom; the first predicate that holds produces the
//! classification. Lists must therefore run from most specific to most
//! general. When nothing matches, a generic `system` classification is built
//! from the input's hints, so every entry is classifiable.

mod aerospace;
mod karabiner;

pub use aerospace::{aerospace_rules, aerospace_service_rules};
pub use karabiner::karabiner_rules;

use keydash_model::ActionType;
use serde::{Deserialize, Serialize};

/// Result of classifying one raw command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub action_label: String,
    pub action_type: ActionType,
    pub description: String,
}

impl Classification {
    pub fn new(label: impl Into<String>, action_type: ActionType, description: impl Into<String>) -> Self {
        Self {
            action_label: label.into(),
            action_type,
            description: description.into(),
        }
    }
}

/// Input to a rule: the raw command plus the fallback hints an adapter supplies.
#[derive(Debug, Clone)]
pub struct RuleInput<'a> {
    /// Canonical key the command is bound to.
    pub key: &'a str,
    /// Raw command as written in the source.
    pub command: &'a str,
    lower: String,
    /// Text truncated into the fallback label.
    pub label_hint: &'a str,
    /// Text used as the fallback description.
    pub description_hint: &'a str,
}

impl<'a> RuleInput<'a> {
    pub fn new(key: &'a str, command: &'a str) -> Self {
        Self {
            key,
            command,
            lower: command.to_lowercase(),
            label_hint: command,
            description_hint: command,
        }
    }

    pub fn with_hints(mut self, label_hint: &'a str, description_hint: &'a str) -> Self {
        self.label_hint = label_hint;
        self.description_hint = description_hint;
        self
    }

    /// Lower-cased command.
    pub fn lower(&self) -> &str {
        &self.lower
    }

    /// Case-insensitive substring test.
    pub fn contains(&self, needle: &str) -> bool {
        self.lower.contains(needle)
    }

    pub fn contains_all(&self, needles: &[&str]) -> bool {
        needles.iter().all(|n| self.lower.contains(n))
    }

    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.lower.contains(n))
    }

    pub fn key_is(&self, key: &str) -> bool {
        self.key == key
    }
}

/// Predicate half of a rule.
pub type Predicate = fn(&RuleInput<'_>) -> bool;

/// Builder half of a rule.
pub type Builder = fn(&RuleInput<'_>) -> Classification;

/// One `(predicate, builder)` pair.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub when: Predicate,
    pub then: Builder,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Outcome of [`RuleSet::explain`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub rule_set: String,
    pub command: String,
    /// Name of the rule that fired, `None` when the fallback was used.
    pub matched_rule: Option<String>,
    /// Rules tried before the match (or all of them for the fallback).
    pub rules_tried: usize,
    pub classification: Classification,
}

impl Explanation {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_human(&self) -> String {
        let c = &self.classification;
        let mut out = format!("Rule set: {}\nCommand:  {}\n", self.rule_set, self.command);
        match &self.matched_rule {
            Some(name) => out.push_str(&format!("Matched:  {} (after {} rule(s))\n", name, self.rules_tried)),
            None => out.push_str(&format!("Matched:  <fallback> ({} rule(s) tried)\n", self.rules_tried)),
        }
        out.push_str(&format!("Label:    {}\nType:     {}\nDesc:     {}", c.action_label, c.action_type, c.description));
        out
    }
}

/// An ordered, first-match-wins rule list.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: &'static str,
    rules: Vec<Rule>,
    /// Max chars of the label hint kept in the fallback label.
    fallback_len: usize,
}

impl RuleSet {
    pub fn new(name: &'static str, fallback_len: usize) -> Self {
        Self {
            name,
            rules: Vec::new(),
            fallback_len,
        }
    }

    /// Append a rule; later rules only fire if every earlier one declined.
    pub fn rule(mut self, name: &'static str, when: Predicate, then: Builder) -> Self {
        self.rules.push(Rule { name, when, then });
        self
    }

    /// Append every rule of `other`, keeping its order.
    pub fn extend(mut self, other: RuleSet) -> Self {
        self.rules.extend(other.rules);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }

    pub fn classify(&self, input: &RuleInput<'_>) -> Classification {
        self.explain(input).classification
    }

    pub fn explain(&self, input: &RuleInput<'_>) -> Explanation {
        let hit = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| (rule.when)(input));

        let (matched_rule, rules_tried, classification) = match hit {
            Some((idx, rule)) => (Some(rule.name.to_string()), idx + 1, (rule.then)(input)),
            None => (None, self.rules.len(), self.fallback(input)),
        };

        Explanation {
            rule_set: self.name.to_string(),
            command: input.command.to_string(),
            matched_rule,
            rules_tried,
            classification,
        }
    }

    fn fallback(&self, input: &RuleInput<'_>) -> Classification {
        let label: String = input.label_hint.trim().chars().take(self.fallback_len).collect();
        let label = if label.is_empty() {
            keydash_model::UNKNOWN_MARKER.to_string()
        } else {
            label
        };
        Classification::new(label, ActionType::System, input.description_hint)
    }
}
