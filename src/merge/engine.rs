//! Per-layer binding merge
//!
//! Merge algorithm, for one layer:
//! 1. Sort the per-source record lists by precedence (unranked sources last,
//!    in arrival order)
//! 2. Walk records in adapter order, skipping invalid ones with a warning
//! 3. Conditional records accumulate as variants unless an unconditional
//!    winner already holds the key; the first one seeds the key
//! 4. Unconditional records claim a free key and lock it; later records for
//!    that key are shadowed
//! 5. Attach accumulated variants to their bindings

use keydash_classifier::derive_icon;
use keydash_model::{BindingRecord, LayerId, MergedBinding, SourceId, Variant};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::precedence::Precedence;
use crate::sources::SourceBindingList;

/// Curated description lookup keyed by `(layer, key)`
pub trait DescriptionLookup {
    fn lookup(&self, layer: LayerId, key: &str) -> Option<String>;
}

/// Lookup that never enriches
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

impl DescriptionLookup for NoEnrichment {
    fn lookup(&self, _layer: LayerId, _key: &str) -> Option<String> {
        None
    }
}

/// One source's records for a single layer
#[derive(Debug, Clone, Copy)]
pub struct SourceBindings<'a> {
    pub source: SourceId,
    pub records: &'a [BindingRecord],
}

impl<'a> SourceBindings<'a> {
    pub fn new(source: SourceId, records: &'a [BindingRecord]) -> Self {
        Self { source, records }
    }
}

/// Why a record or source was not taken at face value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeWarning {
    #[error("{origin}: skipping record with empty key")]
    EmptyKey { origin: SourceId },

    #[error("{origin}: skipping '{key}' with empty action label")]
    EmptyLabel { origin: SourceId, key: String },

    #[error("{origin}: skipping '{key}' with empty condition")]
    EmptyCondition { origin: SourceId, key: String },

    #[error("{list}: skipping '{key}' tagged with source '{tagged}'")]
    SourceMismatch {
        list: SourceId,
        tagged: SourceId,
        key: String,
    },

    #[error("{origin}: not in precedence list, merged after ranked sources")]
    Unranked { origin: SourceId },
}

/// Result of merging one layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMerge {
    pub layer: LayerId,

    /// Key → merged binding, key-ordered
    pub bindings: BTreeMap<String, MergedBinding>,

    pub warnings: Vec<MergeWarning>,

    /// Records dropped because their key was already taken
    pub shadowed: usize,
}

impl LayerMerge {
    fn empty(layer: LayerId) -> Self {
        Self {
            layer,
            bindings: BTreeMap::new(),
            warnings: Vec::new(),
            shadowed: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of bindings that carry conditional variants
    pub fn conditional_count(&self) -> usize {
        self.bindings.values().filter(|b| b.has_variants()).count()
    }
}

/// Merges per-source binding lists under a fixed precedence
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    precedence: Precedence,
}

impl MergeEngine {
    pub fn new(precedence: Precedence) -> Self {
        Self { precedence }
    }

    pub fn precedence(&self) -> &Precedence {
        &self.precedence
    }

    /// Merge every registry layer from whole-source lists.
    ///
    /// Layers with no input still appear, with no bindings.
    pub fn merge_all(
        &self,
        lists: &[SourceBindingList],
        lookup: &dyn DescriptionLookup,
    ) -> BTreeMap<LayerId, LayerMerge> {
        LayerId::ALL
            .into_iter()
            .map(|layer| {
                let inputs: Vec<SourceBindings<'_>> = lists
                    .iter()
                    .map(|list| SourceBindings::new(list.source, list.records(layer)))
                    .collect();
                (layer, self.merge_layer(layer, &inputs, lookup))
            })
            .collect()
    }

    /// Merge one layer's per-source records into a key → binding table
    pub fn merge_layer(
        &self,
        layer: LayerId,
        inputs: &[SourceBindings<'_>],
        lookup: &dyn DescriptionLookup,
    ) -> LayerMerge {
        let mut result = LayerMerge::empty(layer);
        let ordered = self.order(inputs, &mut result.warnings);

        let mut variants: BTreeMap<String, Vec<Variant>> = BTreeMap::new();
        let mut locked: BTreeSet<String> = BTreeSet::new();

        for input in ordered {
            for record in input.records {
                if let Some(warning) = check_record(record, input.source) {
                    warn!(layer = %layer, "{}", warning);
                    result.warnings.push(warning);
                    continue;
                }

                let key = record.key.as_str();
                let description = lookup
                    .lookup(layer, key)
                    .unwrap_or_else(|| record.description.clone());

                match &record.condition {
                    Some(condition) => {
                        if locked.contains(key) {
                            debug!(layer = %layer, key, source = %record.source, "conditional binding shadowed");
                            result.shadowed += 1;
                            continue;
                        }
                        variants.entry(key.to_string()).or_default().push(Variant {
                            condition: condition.clone(),
                            action_label: record.action_label.clone(),
                            action_type: record.action_type,
                            description: description.clone(),
                            raw_command: record.raw_command.clone(),
                        });
                        if !result.bindings.contains_key(key) {
                            result
                                .bindings
                                .insert(key.to_string(), to_merged(record, description));
                        }
                    }
                    None => {
                        if result.bindings.contains_key(key) {
                            debug!(layer = %layer, key, source = %record.source, "binding shadowed");
                            result.shadowed += 1;
                            continue;
                        }
                        result
                            .bindings
                            .insert(key.to_string(), to_merged(record, description));
                        locked.insert(key.to_string());
                    }
                }
            }
        }

        for (key, list) in variants {
            if let Some(binding) = result.bindings.get_mut(&key) {
                binding.variants = Some(list);
            }
        }

        result
    }

    /// Stable sort of inputs by precedence rank; unranked sources keep arrival order at the end
    fn order<'a, 'b>(
        &self,
        inputs: &'b [SourceBindings<'a>],
        warnings: &mut Vec<MergeWarning>,
    ) -> Vec<&'b SourceBindings<'a>> {
        let mut unranked: Vec<SourceId> = Vec::new();
        for input in inputs {
            if !self.precedence.contains(input.source) && !unranked.contains(&input.source) {
                unranked.push(input.source);
            }
        }
        for source in unranked {
            if inputs.iter().any(|i| i.source == source && !i.records.is_empty()) {
                let warning = MergeWarning::Unranked { origin: source };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        let mut ordered: Vec<&SourceBindings<'a>> = inputs.iter().collect();
        ordered.sort_by_key(|input| self.precedence.rank(input.source).unwrap_or(usize::MAX));
        ordered
    }
}

fn check_record(record: &BindingRecord, list_source: SourceId) -> Option<MergeWarning> {
    if record.key.trim().is_empty() {
        return Some(MergeWarning::EmptyKey { origin: list_source });
    }
    if record.source != list_source {
        return Some(MergeWarning::SourceMismatch {
            list: list_source,
            tagged: record.source,
            key: record.key.clone(),
        });
    }
    if record.action_label.trim().is_empty() {
        return Some(MergeWarning::EmptyLabel {
            origin: list_source,
            key: record.key.clone(),
        });
    }
    if record.condition.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Some(MergeWarning::EmptyCondition {
            origin: list_source,
            key: record.key.clone(),
        });
    }
    None
}

fn to_merged(record: &BindingRecord, description: String) -> MergedBinding {
    let icon = derive_icon(record.action_type, &record.action_label, record.raw_command.as_deref());
    MergedBinding::from_record(record, description, icon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydash_model::{ActionType, IconKind};

    struct Curated;

    impl DescriptionLookup for Curated {
        fn lookup(&self, layer: LayerId, key: &str) -> Option<String> {
            (layer == LayerId::Hyper && key == "w").then(|| "Browser workspace".to_string())
        }
    }

    fn record(key: &str, label: &str, source: SourceId) -> BindingRecord {
        BindingRecord::new(key, label, ActionType::System, format!("{} via {}", label, source), source)
    }

    fn merge(inputs: &[SourceBindings<'_>]) -> LayerMerge {
        MergeEngine::default().merge_layer(LayerId::Hyper, inputs, &NoEnrichment)
    }

    #[test]
    fn test_higher_precedence_wins() {
        let a = vec![record("q", "Quit", SourceId::Karabiner)];
        let b = vec![record("q", "Close", SourceId::Aerospace)];
        let result = merge(&[
            SourceBindings::new(SourceId::Karabiner, &a),
            SourceBindings::new(SourceId::Aerospace, &b),
        ]);

        assert_eq!(result.len(), 1);
        assert_eq!(result.bindings["q"].source, SourceId::Karabiner);
        assert_eq!(result.bindings["q"].action_label, "Quit");
        assert_eq!(result.shadowed, 1);
    }

    #[test]
    fn test_precedence_dominates_arrival_order() {
        let a = vec![record("q", "Quit", SourceId::Karabiner)];
        let b = vec![record("q", "Close", SourceId::Aerospace)];
        let result = merge(&[
            SourceBindings::new(SourceId::Aerospace, &b),
            SourceBindings::new(SourceId::Karabiner, &a),
        ]);

        assert_eq!(result.bindings["q"].source, SourceId::Karabiner);
    }

    #[test]
    fn test_low_precedence_unconditional_never_seeds_conditional_key() {
        let a = vec![record("f", "Float", SourceId::Karabiner).with_condition("tiling=1")];
        let b = vec![record("f", "Full", SourceId::Aerospace)];
        let result = merge(&[
            SourceBindings::new(SourceId::Aerospace, &b),
            SourceBindings::new(SourceId::Karabiner, &a),
        ]);

        let f = &result.bindings["f"];
        assert_eq!(f.source, SourceId::Karabiner);
        assert_eq!(f.action_label, "Float");
        assert_eq!(f.variants.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_conditional_variants_accumulate_in_order() {
        let a = vec![
            record("f", "Float", SourceId::Karabiner).with_condition("tiling=1"),
            record("f", "Unfloat", SourceId::Karabiner).with_condition("tiling=0"),
        ];
        let result = merge(&[SourceBindings::new(SourceId::Karabiner, &a)]);

        let f = &result.bindings["f"];
        let variants = f.variants.as_ref().unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].condition, "tiling=1");
        assert_eq!(variants[0].action_label, "Float");
        assert_eq!(variants[1].condition, "tiling=0");
        assert_eq!(variants[1].action_label, "Unfloat");
        // First variant seeds the parent
        assert_eq!(f.action_label, "Float");
        assert_eq!(result.conditional_count(), 1);
    }

    #[test]
    fn test_conditional_after_unconditional_is_shadowed() {
        let a = vec![
            record("f", "Full", SourceId::Karabiner),
            record("f", "Float", SourceId::Karabiner).with_condition("tiling=1"),
        ];
        let result = merge(&[SourceBindings::new(SourceId::Karabiner, &a)]);

        assert!(result.bindings["f"].variants.is_none());
        assert_eq!(result.shadowed, 1);
    }

    #[test]
    fn test_unconditional_does_not_overwrite_conditional_seed() {
        let a = vec![
            record("f", "Float", SourceId::Karabiner).with_condition("tiling=1"),
            record("f", "Full", SourceId::Karabiner),
        ];
        let result = merge(&[SourceBindings::new(SourceId::Karabiner, &a)]);

        let f = &result.bindings["f"];
        assert_eq!(f.action_label, "Float");
        assert_eq!(f.variants.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_variants_span_sources() {
        let a = vec![record("f", "Float", SourceId::Karabiner).with_condition("tiling=1")];
        let b = vec![record("f", "Tile", SourceId::Aerospace).with_condition("tiling=0")];
        let result = merge(&[
            SourceBindings::new(SourceId::Karabiner, &a),
            SourceBindings::new(SourceId::Aerospace, &b),
        ]);

        let variants = result.bindings["f"].variants.as_ref().unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(result.bindings["f"].source, SourceId::Karabiner);
    }

    #[test]
    fn test_enrichment_overrides_description() {
        let a = vec![BindingRecord::new(
            "w",
            "WS 3",
            ActionType::Workspace,
            "Workspace 3",
            SourceId::Karabiner,
        )];
        let result = MergeEngine::default().merge_layer(
            LayerId::Hyper,
            &[SourceBindings::new(SourceId::Karabiner, &a)],
            &Curated,
        );

        let w = &result.bindings["w"];
        assert_eq!(w.description, "Browser workspace");
        assert_eq!(w.icon.kind, IconKind::Ws);
        assert_eq!(w.icon.data.as_deref(), Some("3"));
    }

    #[test]
    fn test_enrichment_applies_to_variants() {
        let a = vec![
            BindingRecord::new("w", "WS 3", ActionType::Workspace, "Workspace 3", SourceId::Karabiner)
                .with_condition("tiling=1"),
            BindingRecord::new("w", "WS 4", ActionType::Workspace, "Workspace 4", SourceId::Karabiner)
                .with_condition("tiling=0"),
        ];
        let result = MergeEngine::default().merge_layer(
            LayerId::Hyper,
            &[SourceBindings::new(SourceId::Karabiner, &a)],
            &Curated,
        );

        let w = &result.bindings["w"];
        let variants = w.variants.as_ref().unwrap();
        assert_eq!(w.description, "Browser workspace");
        assert_eq!(variants[0].description, w.description);
        assert_eq!(variants[1].description, "Browser workspace");
    }

    #[test]
    fn test_enrichment_is_per_layer() {
        let a = vec![record("w", "WS 3", SourceId::Karabiner)];
        let result = MergeEngine::default().merge_layer(
            LayerId::Alt,
            &[SourceBindings::new(SourceId::Karabiner, &a)],
            &Curated,
        );
        assert_eq!(result.bindings["w"].description, "WS 3 via karabiner");
    }

    #[test]
    fn test_empty_source_does_not_affect_others() {
        let empty: Vec<BindingRecord> = Vec::new();
        let b = vec![record("q", "Close", SourceId::Aerospace)];
        let result = merge(&[
            SourceBindings::new(SourceId::Karabiner, &empty),
            SourceBindings::new(SourceId::Aerospace, &b),
        ]);

        assert_eq!(result.bindings["q"].source, SourceId::Aerospace);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_invalid_records_skipped_with_warning() {
        let a = vec![
            record("", "Quit", SourceId::Karabiner),
            record("x", "", SourceId::Karabiner),
            record("y", "Yank", SourceId::Aerospace),
            record("z", "Zoom", SourceId::Karabiner).with_condition(" "),
            record("q", "Quit", SourceId::Karabiner),
        ];
        let result = merge(&[SourceBindings::new(SourceId::Karabiner, &a)]);

        assert_eq!(result.len(), 1);
        assert!(result.bindings.contains_key("q"));
        assert_eq!(result.warnings.len(), 4);
        assert!(matches!(result.warnings[2], MergeWarning::SourceMismatch { .. }));
    }

    #[test]
    fn test_unranked_source_processed_last() {
        let engine = MergeEngine::new(Precedence::new(vec![SourceId::Aerospace]).unwrap());
        let a = vec![record("q", "Quit", SourceId::Karabiner)];
        let b = vec![record("q", "Close", SourceId::Aerospace)];
        let result = engine.merge_layer(
            LayerId::Hyper,
            &[
                SourceBindings::new(SourceId::Karabiner, &a),
                SourceBindings::new(SourceId::Aerospace, &b),
            ],
            &NoEnrichment,
        );

        assert_eq!(result.bindings["q"].source, SourceId::Aerospace);
        assert_eq!(
            result.warnings,
            vec![MergeWarning::Unranked {
                origin: SourceId::Karabiner
            }]
        );
    }

    #[test]
    fn test_merge_all_includes_every_layer() {
        let mut list = SourceBindingList::new(SourceId::Karabiner);
        list.push(LayerId::Alt, record("h", "Focus L", SourceId::Karabiner));

        let merged = MergeEngine::default().merge_all(&[list], &NoEnrichment);

        assert_eq!(merged.len(), LayerId::ALL.len());
        assert_eq!(merged[&LayerId::Alt].len(), 1);
        assert!(merged[&LayerId::Service].is_empty());
    }

    #[test]
    fn test_merge_is_deterministic() {
        let a = vec![
            record("z", "Zoom", SourceId::Karabiner),
            record("a", "App", SourceId::Karabiner),
        ];
        let first = merge(&[SourceBindings::new(SourceId::Karabiner, &a)]);
        let second = merge(&[SourceBindings::new(SourceId::Karabiner, &a)]);

        assert_eq!(first, second);
        let keys: Vec<&String> = first.bindings.keys().collect();
        assert_eq!(keys, vec!["a", "z"]);
    }
}
