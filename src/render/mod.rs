//! Table classification, inline rendering and text cleanup.

mod cleanup;
mod inline;
mod options;
mod stats;

pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use inline::{classify, render_text_table, ComplexReason, TableLayout};
pub use options::{RenderOptions, TableMode};
pub use stats::ConversionStats;
