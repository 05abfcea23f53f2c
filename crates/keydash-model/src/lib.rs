//! Keydash Model Types
//!
//! Defines the intermediate binding record every source adapter produces,
//! the merged dashboard-facing binding, and the static layer registry.

pub mod binding;
pub mod error;
pub mod layer;
pub mod source;

pub use binding::{ActionType, BindingRecord, Icon, IconKind, MergedBinding, Variant};
pub use error::ParseIdError;
pub use layer::{LayerId, LayerMeta, LAYERS};
pub use source::SourceId;

/// Placeholder used wherever a numeric datum could not be extracted.
pub const UNKNOWN_MARKER: &str = "?";
