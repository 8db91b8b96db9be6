//! Markdown input plugin: reads a Markdown file into a SourceDocument.

mod outline;

use std::path::Path;

use md2pdf_core::document::SourceDocument;
use md2pdf_core::error::{ConvertError, Result};
use md2pdf_core::options::ConversionOptions;
use md2pdf_core::plugin::InputPlugin;
use pulldown_cmark::{html, Options, Parser};

pub use outline::flatten_outline;

pub struct MarkdownInputPlugin;

impl InputPlugin for MarkdownInputPlugin {
    fn name(&self) -> &str {
        "Markdown Input"
    }

    fn convert(&self, input_path: &Path, _options: &ConversionOptions) -> Result<SourceDocument> {
        log::info!("Reading Markdown: {}", input_path.display());

        let bytes = std::fs::read(input_path).map_err(|source| ConvertError::Read {
            path: input_path.to_path_buf(),
            source,
        })?;
        let (markdown, encoding) = md2pdf_utils::encoding::decode_source(&bytes);
        log::debug!("Decoded {} bytes as {}", bytes.len(), encoding);

        let title = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled");

        Ok(parse_markdown(title, &markdown))
    }
}

/// Parse Markdown text into a SourceDocument.
pub fn parse_markdown(title: &str, markdown: &str) -> SourceDocument {
    let mut doc = SourceDocument::new(title);
    doc.html = markdown_to_html(markdown);
    doc.outline = flatten_outline(markdown);
    log::debug!(
        "Parsed '{}': {} bytes of HTML, {} outline lines",
        title,
        doc.html.len(),
        doc.outline.len()
    );
    doc
}

/// Render Markdown to an HTML fragment using pulldown-cmark.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options());
    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, parser);
    html_output
}

/// Extensions enabled for every parse.
pub(crate) fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES
}
