//! Document conversion entry points.
//!
//! [`convert_str`] runs the table pipeline on text held in memory.
//! [`convert_file`] and [`convert_files`] add the on-disk layout: each
//! source `<stem>.md` becomes `<out>/<stem>.mmd`, and complex tables go
//! to `<out>/assets/<stem>.xlsx`.
//!
//! # Example
//!
//! ```no_run
//! use tabmark::convert::{convert_file, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> tabmark::Result<()> {
//!     let options = ConvertOptions::default();
//!     let result = convert_file(Path::new("report.md"), Path::new("out"), &options)?;
//!     println!("{} tables, {} sheets", result.stats.table_count, result.stats.sheet_count);
//!     Ok(())
//! }
//! ```

mod driver;

pub use driver::{convert_str, embed_directive, unconverted_images};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::render::{ConversionStats, RenderOptions};
use crate::sheet::SheetRef;

/// Source extensions accepted by [`convert_file`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["md", "mmd", "markdown"];

/// Directory, relative to the output directory, that holds workbooks.
pub const ASSETS_DIR: &str = "assets";

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Rendering options
    pub render: RenderOptions,

    /// Where the workbook is saved
    pub workbook_path: PathBuf,

    /// Path written into embed directives (defaults to `workbook_path`)
    pub workbook_ref: Option<String>,

    /// Convert batches in parallel
    pub parallel: bool,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set the workbook output path.
    pub fn with_workbook_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.workbook_path = path.into();
        self
    }

    /// Set the path text used in embed directives.
    pub fn with_workbook_ref(mut self, reference: impl Into<String>) -> Self {
        self.workbook_ref = Some(reference.into());
        self
    }

    /// Disable parallel batch conversion.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Path text written into embed directives.
    pub fn workbook_ref(&self) -> String {
        self.workbook_ref
            .clone()
            .unwrap_or_else(|| self.workbook_path.to_string_lossy().into_owned())
    }

    /// Options for one source file converted into `output_dir`.
    fn for_source(&self, stem: &str, output_dir: &Path) -> Self {
        let name = format!("{}.xlsx", stem);
        Self {
            workbook_path: output_dir.join(ASSETS_DIR).join(&name),
            workbook_ref: Some(format!("{}/{}", ASSETS_DIR, name)),
            ..self.clone()
        }
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            workbook_path: PathBuf::from(ASSETS_DIR).join("tables.xlsx"),
            workbook_ref: None,
            parallel: true,
        }
    }
}

/// Result of converting one document.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    /// Converted document text
    pub content: String,

    /// Saved workbook, if any table needed one
    pub workbook: Option<PathBuf>,

    /// Worksheets in document order
    pub sheets: Vec<SheetRef>,

    /// Conversion statistics
    pub stats: ConversionStats,

    /// Recoverable problems found after conversion
    pub warnings: Vec<String>,

    /// Written document, for file conversions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl ConvertResult {
    /// Check if any warnings were raised.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Serialize the result (content included) as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }
}

/// Convert one source file into `output_dir`.
///
/// Writes `<output_dir>/<stem>.mmd` and, when the document has complex
/// tables, `<output_dir>/assets/<stem>.xlsx`.
pub fn convert_file(
    source: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<ConvertResult> {
    let stem = source_stem(source)?;
    let text = fs::read_to_string(source)?;

    fs::create_dir_all(output_dir)?;
    let output = output_dir.join(format!("{}.mmd", stem));
    if output.exists() && fs::canonicalize(&output)? == fs::canonicalize(source)? {
        return Err(Error::InvalidInput(format!(
            "{} would be overwritten by its own output",
            source.display()
        )));
    }

    log::info!("Converting {}", source.display());
    let mut result = driver::convert_str(&text, &options.for_source(stem, output_dir))?;
    fs::write(&output, &result.content)?;
    result.output = Some(output);
    Ok(result)
}

/// Convert several files into `output_dir`, one independent pipeline each.
///
/// Results come back in input order. Sources whose stems collide (they
/// would write the same output files) fail after the first one.
pub fn convert_files<P>(
    sources: &[P],
    output_dir: &Path,
    options: &ConvertOptions,
) -> Vec<Result<ConvertResult>>
where
    P: AsRef<Path> + Sync,
{
    let mut seen = HashSet::new();
    let unique: Vec<bool> = sources
        .iter()
        .map(|s| match source_stem(s.as_ref()) {
            Ok(stem) => seen.insert(stem.to_lowercase()),
            Err(_) => true,
        })
        .collect();

    let convert_one = |(source, unique): (&P, &bool)| {
        let source = source.as_ref();
        if *unique {
            convert_file(source, output_dir, options)
        } else {
            Err(Error::InvalidInput(format!(
                "{} has the same name as an earlier source",
                source.display()
            )))
        }
    };

    if options.parallel {
        sources
            .par_iter()
            .zip(unique.par_iter())
            .map(convert_one)
            .collect()
    } else {
        sources.iter().zip(unique.iter()).map(convert_one).collect()
    }
}

fn source_stem(source: &Path) -> Result<&str> {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| Error::InvalidInput(format!("{} has no extension", source.display())))?;
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::InvalidInput(format!(
            "unsupported extension '{}' (expected one of: {})",
            ext,
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }
    source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            Error::InvalidInput(format!("{} has no usable file name", source.display()))
        })
}
