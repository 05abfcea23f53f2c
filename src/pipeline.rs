//! Pipeline orchestration
//!
//! One `generate` run:
//! - Load every enabled binding source (failures degrade to empty lists)
//! - Load the cheatsheet for description enrichment
//! - Merge each layer under the configured precedence
//! - Assemble the export object and write the artifacts
//! - Report a per-layer summary
//!
//! Everything runs sequentially and is recomputed from scratch each run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use keydash_model::{LayerId, SourceId};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, KeydashConfig};
use crate::export::{write_export, Export, ExportError, ExportTargets};
use crate::merge::{DescriptionLookup, LayerMerge, MergeEngine};
use crate::sources::{
    load_source, AerospaceAdapter, Cheatsheet, KarabinerAdapter, RectangleAdapter, SourceAdapter, SourceBindingList,
};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 1,
            PipelineError::Export(_) => 1,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Per-layer outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub layer: LayerId,
    pub name: String,
    pub bindings: usize,
    /// Bindings that carry conditional variants
    pub conditional: usize,
    /// Records dropped because a higher-precedence binding held the key
    pub shadowed: usize,
    pub warnings: usize,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Records contributed per binding source (0 when missing or disabled)
    pub sources: BTreeMap<SourceId, usize>,
    pub layers: Vec<LayerSummary>,
    pub total_bindings: usize,
    /// SHA-256 of the canonical `layers` object
    pub layers_digest: String,
    /// Artifacts written
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    fn new(lists: &[SourceBindingList], merged: &BTreeMap<LayerId, LayerMerge>, layers_digest: String) -> Self {
        let sources = lists.iter().map(|l| (l.source, l.len())).collect();
        let layers: Vec<LayerSummary> = merged
            .values()
            .map(|m| LayerSummary {
                layer: m.layer,
                name: m.layer.meta().name.to_string(),
                bindings: m.len(),
                conditional: m.conditional_count(),
                shadowed: m.shadowed,
                warnings: m.warnings.len(),
            })
            .collect();
        let total_bindings = layers.iter().map(|l| l.bindings).sum();

        Self {
            sources,
            layers,
            total_bindings,
            layers_digest,
            written: Vec::new(),
        }
    }

    /// Human-readable summary, one line per layer
    pub fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for layer in &self.layers {
            let mut line = format!("  {}: {} bindings", layer.name, layer.bindings);
            if layer.conditional > 0 {
                line.push_str(&format!(" ({} conditional)", layer.conditional));
            }
            if layer.warnings > 0 {
                line.push_str(&format!(" [{} skipped]", layer.warnings));
            }
            lines.push(line);
        }
        lines.push(format!("  Total: {} bindings", self.total_bindings));
        lines.join("\n")
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Pipeline execution context
pub struct Pipeline {
    config: KeydashConfig,
    engine: MergeEngine,
}

impl Pipeline {
    /// Create a pipeline for a validated config
    pub fn new(config: KeydashConfig) -> PipelineResult<Self> {
        let engine = MergeEngine::new(config.precedence()?);
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &KeydashConfig {
        &self.config
    }

    /// Load every binding source in turn
    pub fn collect(&self) -> Vec<SourceBindingList> {
        let karabiner = KarabinerAdapter::new();
        let aerospace = AerospaceAdapter::new();
        let rectangle = RectangleAdapter::new(self.config.timeouts.rectangle_seconds);
        let adapters: [&dyn SourceAdapter; 3] = [&karabiner, &aerospace, &rectangle];

        adapters
            .into_iter()
            .map(|adapter| {
                let path = self.config.source_path(adapter.id());
                load_source(adapter, path.as_deref())
            })
            .collect()
    }

    /// Load the enrichment cheatsheet
    pub fn cheatsheet(&self) -> Cheatsheet {
        let path = self.config.source_path(SourceId::Hammerspoon);
        Cheatsheet::load_or_empty(path.as_deref())
    }

    /// Merge already-loaded sources and assemble the export. No I/O.
    pub fn assemble(
        &self,
        lists: &[SourceBindingList],
        lookup: &dyn DescriptionLookup,
        generated: DateTime<Utc>,
    ) -> PipelineResult<(Export, RunSummary)> {
        info!("Merging bindings ({})...", self.engine.precedence());
        let merged = self.engine.merge_all(lists, lookup);
        let export = Export::assemble(&merged, self.config.provenance(), generated);
        let summary = RunSummary::new(lists, &merged, export.layers_digest()?);
        Ok((export, summary))
    }

    /// Load, merge and assemble without writing anything
    pub fn build(&self) -> PipelineResult<(Export, RunSummary)> {
        let lists = self.collect();
        let cheatsheet = self.cheatsheet();
        self.assemble(&lists, &cheatsheet, Utc::now())
    }

    /// Full run: build and write the selected artifacts
    pub fn run(&self, targets: ExportTargets) -> PipelineResult<(Export, RunSummary)> {
        let (export, mut summary) = self.build()?;
        summary.written = write_export(&export, &self.config.output_dir(), targets)?;
        for line in summary.to_human().lines() {
            info!("{}", line);
        }
        Ok((export, summary))
    }
}
