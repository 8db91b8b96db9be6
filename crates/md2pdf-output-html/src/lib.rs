//! External-renderer output plugin: writes the Markdown as a styled HTML page
//! and has wkhtmltopdf or a headless browser print it to PDF.

pub mod renderer;
pub mod template;

use std::io::Write;
use std::path::Path;

use md2pdf_core::document::SourceDocument;
use md2pdf_core::error::{ConvertError, Result};
use md2pdf_core::options::{ConversionOptions, Engine};
use md2pdf_core::plugin::OutputPlugin;

use crate::renderer::select_renderer;
use crate::template::render_page;

pub struct ExternalPdfOutputPlugin;

impl OutputPlugin for ExternalPdfOutputPlugin {
    fn name(&self) -> &str {
        "External Renderer Output"
    }

    fn engine(&self) -> Engine {
        Engine::External
    }

    fn convert(
        &self,
        doc: &SourceDocument,
        output_path: &Path,
        options: &ConversionOptions,
    ) -> Result<()> {
        let renderer = select_renderer(&options.renderers)?;
        log::info!(
            "Writing PDF via {}: {}",
            renderer.candidate.program,
            output_path.display()
        );

        let page = render_page(&doc.title, &doc.html, options.font_size, options.page_size);

        // Removed when `html` is dropped, whichever way this function exits.
        let html = write_temp_html(output_path, &page)?;
        let html_path = html.path().canonicalize()?;
        log::debug!("Temporary HTML: {}", html_path.display());

        renderer.render(&html_path, output_path, options.page_size)
    }
}

/// Write `page` to `<stem>_XXXXXX_tmp.html` in the output's directory.
fn write_temp_html(output_path: &Path, page: &str) -> Result<tempfile::NamedTempFile> {
    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let stem = output_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("md2pdf");

    let write_err = |source| ConvertError::Write {
        path: dir.to_path_buf(),
        source,
    };
    let mut file = tempfile::Builder::new()
        .prefix(&format!("{}_", stem))
        .suffix("_tmp.html")
        .tempfile_in(dir)
        .map_err(write_err)?;
    file.write_all(page.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;
    Ok(file)
}
