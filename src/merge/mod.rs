//! Merge engine
//!
//! Combines the binding lists of every source into one key → binding table
//! per layer, with strict source precedence, conditional variants and
//! description enrichment.

mod engine;
mod precedence;

pub use engine::{DescriptionLookup, LayerMerge, MergeEngine, MergeWarning, NoEnrichment, SourceBindings};
pub use precedence::{Precedence, PrecedenceError};
