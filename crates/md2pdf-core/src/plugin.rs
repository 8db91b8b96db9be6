//! Plugin traits for the input reader and the PDF-producing engines.

use std::path::Path;

use crate::document::SourceDocument;
use crate::error::Result;
use crate::options::{ConversionOptions, Engine};

/// Progress reporter callback type.
pub type ProgressReporter = Box<dyn Fn(f64, &str) + Send + Sync>;

/// Input plugin: reads a source file into a SourceDocument.
pub trait InputPlugin: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// Read and parse the input file.
    fn convert(&self, input_path: &Path, options: &ConversionOptions) -> Result<SourceDocument>;
}

/// Output plugin: turns a SourceDocument into a PDF file.
pub trait OutputPlugin: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// The engine this plugin implements.
    fn engine(&self) -> Engine;

    /// Write the PDF to `output_path`.
    fn convert(
        &self,
        doc: &SourceDocument,
        output_path: &Path,
        options: &ConversionOptions,
    ) -> Result<()>;
}
