//! Dashboard export
//!
//! Assembles merged layers, registry metadata and source provenance into the
//! export object, then writes it as `keybindings.json` and as a browser
//! script (`keybindings-data.js`) that sets `window.KEYBINDINGS_DATA`.
//! Assembly is pure; only `write_export` touches the filesystem.

use chrono::{DateTime, Utc};
use keydash_model::{LayerId, MergedBinding, SourceId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::merge::LayerMerge;

/// JSON artifact file name
pub const JSON_FILE: &str = "keybindings.json";

/// Browser script artifact file name
pub const JS_FILE: &str = "keybindings-data.js";

const JS_HEADER: &str = "// Auto-generated by keydash - do not edit";

/// One exported layer: registry metadata plus its bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLayer {
    pub name: String,
    pub activator_keys: Vec<String>,
    pub layer_class: String,
    pub description: String,
    pub bindings: BTreeMap<String, MergedBinding>,
}

impl ExportLayer {
    fn new(layer: LayerId, bindings: BTreeMap<String, MergedBinding>) -> Self {
        let meta = layer.meta();
        Self {
            name: meta.name.to_string(),
            activator_keys: meta.activator_keys.iter().map(|k| k.to_string()).collect(),
            layer_class: meta.layer_class.to_string(),
            description: meta.description.to_string(),
            bindings,
        }
    }
}

/// The exported dashboard model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    /// Generation time (RFC 3339)
    pub generated: DateTime<Utc>,

    /// Every known source → its config file, or null when GUI-configured or disabled
    pub source_files: BTreeMap<SourceId, Option<String>>,

    /// Every registry layer, in registry order
    pub layers: BTreeMap<LayerId, ExportLayer>,
}

impl Export {
    /// Assemble the export object.
    ///
    /// Every registry layer is present, with empty bindings if nothing merged
    /// into it, so the artifact keeps a stable shape.
    pub fn assemble(
        merged: &BTreeMap<LayerId, LayerMerge>,
        source_files: BTreeMap<SourceId, Option<String>>,
        generated: DateTime<Utc>,
    ) -> Self {
        let layers = LayerId::ALL
            .into_iter()
            .map(|layer| {
                let bindings = merged
                    .get(&layer)
                    .map(|m| m.bindings.clone())
                    .unwrap_or_default();
                (layer, ExportLayer::new(layer, bindings))
            })
            .collect();

        Self {
            generated,
            source_files,
            layers,
        }
    }

    /// Total bindings across layers
    pub fn binding_count(&self) -> usize {
        self.layers.values().map(|l| l.bindings.len()).sum()
    }

    /// Serialize to JSON (pretty printed)
    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::Serialize(e.to_string()))
    }

    /// Browser script that assigns the export to `window.KEYBINDINGS_DATA`
    pub fn to_js(&self) -> Result<String, ExportError> {
        Ok(format!("{}\nwindow.KEYBINDINGS_DATA = {};\n", JS_HEADER, self.to_json()?))
    }

    /// SHA-256 hex digest of JCS(layers).
    ///
    /// Excludes `generated`, so unchanged inputs give the same digest.
    pub fn layers_digest(&self) -> Result<String, ExportError> {
        let jcs_bytes =
            serde_json_canonicalizer::to_vec(&self.layers).map_err(|e| ExportError::Jcs(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Which artifacts to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTargets {
    pub json: bool,
    pub js: bool,
}

impl Default for ExportTargets {
    fn default() -> Self {
        Self { json: true, js: true }
    }
}

/// Write the selected artifacts into `dir`, creating it if needed.
///
/// Returns the paths written.
pub fn write_export(export: &Export, dir: &Path, targets: ExportTargets) -> Result<Vec<PathBuf>, ExportError> {
    let mut written = Vec::new();
    if !targets.json && !targets.js {
        return Ok(written);
    }

    fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    if targets.json {
        let path = dir.join(JSON_FILE);
        write_file(&path, &export.to_json()?)?;
        written.push(path);
    }
    if targets.js {
        let path = dir.join(JS_FILE);
        write_file(&path, &export.to_js()?)?;
        written.push(path);
    }

    Ok(written)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::info!("Generated: {}", path.display());
    Ok(())
}

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("JCS canonicalization error: {0}")]
    Jcs(String),

    #[error("failed to write {path}: {message}")]
    Io { path: PathBuf, message: String },
}
