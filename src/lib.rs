//! keydash - keyboard shortcut dashboard generator
//!
//! This crate reads the keyboard configuration of several macOS tools
//! (Karabiner-Elements, AeroSpace, Rectangle Pro and a Hammerspoon
//! cheatsheet), merges their bindings per modifier layer under a source
//! precedence, and exports the result for a browser dashboard.

pub mod config;
pub mod export;
pub mod merge;
pub mod pipeline;
pub mod sources;
pub mod timeout;

pub use config::{EffectiveConfig, KeydashConfig};
pub use export::{Export, ExportTargets};
pub use merge::{LayerMerge, MergeEngine, Precedence};
pub use pipeline::{Pipeline, PipelineError, RunSummary};
pub use sources::{Cheatsheet, SourceAdapter, SourceBindingList};
