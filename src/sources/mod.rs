//! Source adapters
//!
//! Each adapter turns one tool's configuration into `BindingRecord`s grouped
//! by layer. Extraction is pure (`extract(raw)`); I/O lives in `read` and in
//! `load_source`, which turns every failure into an empty list plus a
//! warning so one broken source never stops the others.

mod aerospace;
mod hammerspoon;
mod karabiner;
mod rectangle;

pub use aerospace::AerospaceAdapter;
pub use hammerspoon::{normalize_section_title, Cheatsheet, CheatsheetItem};
pub use karabiner::KarabinerAdapter;
pub use rectangle::RectangleAdapter;

use keydash_model::{BindingRecord, LayerId, SourceId};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::timeout::CommandError;

/// One source's records, grouped by layer in adapter order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBindingList {
    pub source: SourceId,
    layers: BTreeMap<LayerId, Vec<BindingRecord>>,
}

impl SourceBindingList {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            layers: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, layer: LayerId, record: BindingRecord) {
        self.layers.entry(layer).or_default().push(record);
    }

    /// Records for a layer; empty if the source has none there
    pub fn records(&self, layer: LayerId) -> &[BindingRecord] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &[BindingRecord])> + '_ {
        self.layers.iter().map(|(layer, records)| (*layer, records.as_slice()))
    }

    /// Total records across layers
    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source adapter errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0} not found")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// A configuration source that yields binding records
pub trait SourceAdapter {
    fn id(&self) -> SourceId;

    /// Extract bindings from the source's raw text
    fn extract(&self, raw: &str) -> Result<SourceBindingList, SourceError>;

    /// Read the source's raw text
    fn read(&self, path: &Path) -> Result<String, SourceError> {
        fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and extract, propagating errors
    fn load(&self, path: &Path) -> Result<SourceBindingList, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }
        let raw = self.read(path)?;
        self.extract(&raw)
    }
}

/// Load a source, degrading any failure to an empty list.
///
/// `None` means the source is disabled in config.
pub fn load_source(adapter: &dyn SourceAdapter, path: Option<&Path>) -> SourceBindingList {
    let source = adapter.id();
    let Some(path) = path else {
        debug!(source = %source, "source disabled");
        return SourceBindingList::new(source);
    };

    info!("Parsing {}...", source.display_name());
    match adapter.load(path) {
        Ok(list) => {
            for (layer, records) in list.layers() {
                info!("  {}: {} bindings", layer, records.len());
            }
            list
        }
        Err(e) => {
            warn!(source = %source, path = %path.display(), "source unavailable: {}", e);
            SourceBindingList::new(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydash_model::ActionType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct Lines;

    impl SourceAdapter for Lines {
        fn id(&self) -> SourceId {
            SourceId::Karabiner
        }

        fn extract(&self, raw: &str) -> Result<SourceBindingList, SourceError> {
            let mut list = SourceBindingList::new(self.id());
            for line in raw.lines() {
                if line == "bad" {
                    return Err(SourceError::Parse("bad line".to_string()));
                }
                list.push(
                    LayerId::Hyper,
                    BindingRecord::new(line, line, ActionType::System, line, self.id()),
                );
            }
            Ok(list)
        }
    }

    #[test]
    fn test_binding_list_grouping() {
        let mut list = SourceBindingList::new(SourceId::Aerospace);
        list.push(LayerId::Alt, BindingRecord::new("h", "Foc L", ActionType::Focus, "", SourceId::Aerospace));
        list.push(LayerId::Alt, BindingRecord::new("l", "Foc R", ActionType::Focus, "", SourceId::Aerospace));

        assert_eq!(list.len(), 2);
        assert_eq!(list.records(LayerId::Alt)[1].key, "l");
        assert!(list.records(LayerId::Hyper).is_empty());
    }

    #[test]
    fn test_load_source_reads_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "q").unwrap();
        writeln!(temp, "w").unwrap();

        let list = load_source(&Lines, Some(temp.path()));
        assert_eq!(list.records(LayerId::Hyper).len(), 2);
    }

    #[test]
    fn test_load_source_missing_file_is_empty() {
        let list = load_source(&Lines, Some(Path::new("/nonexistent/keydash/source")));
        assert!(list.is_empty());
        assert_eq!(list.source, SourceId::Karabiner);
    }

    #[test]
    fn test_load_source_parse_error_is_empty() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "q").unwrap();
        writeln!(temp, "bad").unwrap();

        assert!(load_source(&Lines, Some(temp.path())).is_empty());
    }

    #[test]
    fn test_load_source_disabled() {
        assert!(load_source(&Lines, None).is_empty());
    }

    #[test]
    fn test_load_propagates_not_found() {
        let err = Lines.load(Path::new("/nonexistent/keydash/source")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }
}
