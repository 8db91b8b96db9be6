//! Direct PDF output plugin: lays typed text lines onto pages.
//!
//! Uses printpdf 0.8 with embedded TrueType fonts and Op-based page
//! construction. Headings are bold and sized by level, bullets are indented,
//! everything else is word-wrapped body text.

pub mod fonts;
pub mod layout;
pub mod page;

use std::path::Path;

use md2pdf_core::classify::{classify_text, LineKind};
use md2pdf_core::document::SourceDocument;
use md2pdf_core::error::{ConvertError, Result};
use md2pdf_core::options::{ConversionOptions, Engine, TextSource};
use md2pdf_core::plugin::OutputPlugin;
use printpdf::{PdfDocument, PdfSaveOptions};

use crate::fonts::Fonts;
use crate::layout::{layout_lines, Cell};
use crate::page::PageBuilder;

pub struct PdfOutputPlugin;

impl OutputPlugin for PdfOutputPlugin {
    fn name(&self) -> &str {
        "PDF Output"
    }

    fn engine(&self) -> Engine {
        Engine::Direct
    }

    fn convert(
        &self,
        doc: &SourceDocument,
        output_path: &Path,
        options: &ConversionOptions,
    ) -> Result<()> {
        log::info!(
            "Writing PDF: {} ({}, {}pt, {} text)",
            output_path.display(),
            options.page_size,
            options.font_size,
            options.text_source
        );
        let lines = line_kinds(doc, options.text_source);
        let bytes = render_pdf(&doc.title, &lines, options)?;

        std::fs::write(output_path, bytes).map_err(|source| ConvertError::Write {
            path: output_path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

/// The lines the direct engine lays out for `doc`.
///
/// The tree source keeps the structure the parser found. The HTML source
/// strips tags and re-infers structure from `#` and `- ` prefixes.
pub fn line_kinds(doc: &SourceDocument, source: TextSource) -> Vec<LineKind> {
    match source {
        TextSource::Tree => doc.outline.clone(),
        TextSource::Html => classify_text(&md2pdf_utils::html::strip_html(&doc.html)),
    }
}

/// Lay out `lines` and serialize the result to PDF bytes.
pub fn render_pdf(title: &str, lines: &[LineKind], options: &ConversionOptions) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(title);
    let fonts = Fonts::load(&mut doc, options)?;
    let cells = layout_lines(lines, options.font_size);
    warn_missing_glyphs(&fonts, &cells);

    let mut builder = PageBuilder::new(options.page_size, &fonts);
    for cell in cells {
        match cell {
            Cell::Space(mm) => builder.advance(mm),
            Cell::Text(cell) => {
                builder.write_wrapped(&cell.text, cell.font_size, cell.bold, cell.indent_mm);
                builder.advance(cell.space_after_mm);
            }
        }
    }

    let pages = builder.finish();
    log::debug!("Laid out {} page(s)", pages.len());

    let mut warnings = Vec::new();
    let bytes = doc
        .with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut warnings);
    for warning in &warnings {
        log::debug!("printpdf: {:?}", warning);
    }

    if !bytes.starts_with(b"%PDF") {
        return Err(ConvertError::Pdf("serializer produced no PDF data".to_string()));
    }
    Ok(bytes)
}

fn warn_missing_glyphs(fonts: &Fonts, cells: &[Cell]) {
    let mut missing: Vec<char> = cells
        .iter()
        .filter_map(|cell| match cell {
            Cell::Text(t) => Some(fonts.face(t.bold).missing_glyphs(&t.text)),
            Cell::Space(_) => None,
        })
        .flatten()
        .collect();
    if missing.is_empty() {
        return;
    }
    missing.sort_unstable();
    missing.dedup();
    let sample: String = missing.iter().take(10).collect();
    log::warn!(
        "{} character(s) have no glyph in the selected font and render blank ({}); \
         use --font to pick a font that covers them",
        missing.len(),
        sample
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::Object;
    use md2pdf_core::classify::BULLET_PREFIX;
    use md2pdf_core::options::PageSize;
    use md2pdf_input_markdown::parse_markdown;

    const PT_PER_MM: f32 = 72.0 / 25.4;

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    /// Decoded content-stream operations, one list per page.
    fn page_ops(bytes: &[u8]) -> Vec<Vec<Operation>> {
        let pdf = lopdf::Document::load_mem(bytes).unwrap();
        pdf.get_pages()
            .values()
            .map(|&id| {
                let raw = pdf.get_page_content(id).unwrap();
                Content::decode(&raw).unwrap().operations
            })
            .collect()
    }

    fn ops_named<'a>(
        pages: &'a [Vec<Operation>],
        name: &'a str,
    ) -> impl Iterator<Item = &'a Operation> {
        pages.iter().flatten().filter(move |op| op.operator == name)
    }

    fn floats(op: &Operation) -> Vec<f32> {
        op.operands.iter().filter_map(|o| o.as_float().ok()).collect()
    }

    /// Glyph ids of every shown string, one list per text operator.
    fn shown_glyphs(pages: &[Vec<Operation>]) -> Vec<Vec<u16>> {
        let mut shown = Vec::new();
        for op in pages.iter().flatten() {
            let strings: Vec<&Object> = match op.operator.as_str() {
                "Tj" => op.operands.iter().collect(),
                "TJ" => op
                    .operands
                    .iter()
                    .filter_map(|o| o.as_array().ok())
                    .flatten()
                    .collect(),
                _ => continue,
            };
            let bytes: Vec<u8> = strings
                .into_iter()
                .filter_map(|o| o.as_str().ok())
                .flatten()
                .copied()
                .collect();
            shown.push(
                bytes
                    .chunks(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect(),
            );
        }
        shown
    }

    fn render_markdown(markdown: &str, options: &ConversionOptions) -> Vec<u8> {
        let doc = parse_markdown("Test", markdown);
        render_pdf(&doc.title, &doc.outline, options).unwrap()
    }

    fn bundled_fonts() -> Fonts {
        let mut doc = PdfDocument::new("fonts");
        Fonts::load(&mut doc, &ConversionOptions::default()).unwrap()
    }

    #[test]
    fn test_pdf_output_basic() {
        let doc = parse_markdown("Test PDF", "# Chapter 1\n\nHello world.\n\n- one\n- two\n");

        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("basic.pdf");
        PdfOutputPlugin
            .convert(&doc, &output, &ConversionOptions::default())
            .unwrap();

        let data = std::fs::read(&output).unwrap();
        assert!(data.len() > 100);
        assert_eq!(&data[..5], b"%PDF-");
        assert_eq!(page_count(&data), 1);
    }

    #[test]
    fn test_text_positions_stay_on_page() {
        let markdown: String = (0..150)
            .map(|i| format!("## Part {}\n\nParagraph {} of filler text.\n\n- item\n\n", i, i))
            .collect();
        for page_size in [PageSize::A4, PageSize::Letter, PageSize::Legal] {
            let options = ConversionOptions {
                page_size,
                ..Default::default()
            };
            let pages = page_ops(&render_markdown(&markdown, &options));
            assert!(pages.len() > 1);
            assert_eq!(ops_named(&pages, "Td").count(), 0);

            let (w_mm, h_mm) = page_size.dimensions_mm();
            let (w, h) = (w_mm * PT_PER_MM, h_mm * PT_PER_MM);
            let origins: Vec<Vec<f32>> = ops_named(&pages, "Tm").map(floats).collect();
            assert!(!origins.is_empty());
            for m in &origins {
                assert_eq!(m.len(), 6);
                let (x, y) = (m[4], m[5]);
                assert!(x > 0.0 && x < w, "x {} outside {}", x, w);
                assert!(y > 0.0 && y < h, "y {} outside {}", y, h);
            }
        }
    }

    #[test]
    fn test_lines_run_down_the_page() {
        let bytes = render_markdown("first\n\nsecond\n\nthird\n", &ConversionOptions::default());
        let pages = page_ops(&bytes);
        let ys: Vec<f32> = ops_named(&pages, "Tm").map(|op| floats(op)[5]).collect();
        assert_eq!(ys.len(), 3);
        assert!(ys[0] > ys[1] && ys[1] > ys[2]);
        let top = (297.0 - page::MARGIN) * PT_PER_MM;
        assert!(ys[0] < top && ys[0] > top - 24.0);
    }

    #[test]
    fn test_heading_and_body_font_sizes() {
        let markdown = "# Title\n\nBody text.\n\n### Third\n";
        let pages = page_ops(&render_markdown(markdown, &ConversionOptions::default()));
        let sizes: Vec<f32> = ops_named(&pages, "Tf").map(|op| floats(op)[0]).collect();
        assert_eq!(sizes, vec![20.0, 12.0, 16.0]);

        let options = ConversionOptions {
            font_size: 10.0,
            ..Default::default()
        };
        let pages = page_ops(&render_markdown("# Title\n\nBody\n", &options));
        let sizes: Vec<f32> = ops_named(&pages, "Tf").map(|op| floats(op)[0]).collect();
        assert_eq!(sizes, vec![18.0, 10.0]);
    }

    #[test]
    fn test_bullet_and_accents_use_embedded_glyphs() {
        let fonts = bundled_fonts();
        let bytes = render_markdown("- Über café\n", &ConversionOptions::default());
        let shown = shown_glyphs(&page_ops(&bytes));

        let text = format!("{}Über café", BULLET_PREFIX);
        let expected: Vec<u16> = text
            .chars()
            .map(|c| fonts.regular.parsed.lookup_glyph_index(c as u32).unwrap())
            .collect();
        assert_eq!(shown, vec![expected.clone()]);
        assert!(expected.iter().all(|&gid| gid != 0));
    }

    #[test]
    fn test_escaped_hash_is_shown_verbatim() {
        let fonts = bundled_fonts();
        let bytes = render_markdown("\\# not a heading\n", &ConversionOptions::default());
        let pages = page_ops(&bytes);
        let sizes: Vec<f32> = ops_named(&pages, "Tf").map(|op| floats(op)[0]).collect();
        assert_eq!(sizes, vec![12.0]);
        let hash = fonts.regular.parsed.lookup_glyph_index('#' as u32).unwrap();
        assert_eq!(shown_glyphs(&pages)[0][0], hash);
    }

    #[test]
    fn test_cjk_wraps_and_lacks_bundled_glyphs() {
        let markdown = "漢字".repeat(120);
        let pages = page_ops(&render_markdown(&markdown, &ConversionOptions::default()));
        let shown = shown_glyphs(&pages);
        assert!(shown.len() > 1);
        assert_eq!(shown.iter().map(Vec::len).sum::<usize>(), 240);
        assert!(shown.iter().flatten().all(|&gid| gid == 0));
    }

    #[test]
    fn test_bullet_continuation_hangs() {
        let words = "word ".repeat(80);
        let bytes = render_markdown(&format!("- {}\n", words), &ConversionOptions::default());
        let pages = page_ops(&bytes);
        let xs: Vec<f32> = ops_named(&pages, "Tm").map(|op| floats(op)[4]).collect();
        assert!(xs.len() > 1);
        let first = (page::MARGIN + layout::BULLET_INDENT_MM) * PT_PER_MM;
        assert!((xs[0] - first).abs() < 0.1);
        assert!(xs[1..].iter().all(|&x| x > first + 1.0));
    }

    #[test]
    fn test_long_document_paginates() {
        let markdown: String = (0..300)
            .map(|i| format!("Paragraph number {} with a few words of filler text.\n\n", i))
            .collect();
        let doc = parse_markdown("Long", &markdown);

        let bytes = render_pdf(&doc.title, &doc.outline, &ConversionOptions::default()).unwrap();
        assert!(page_count(&bytes) > 1);
    }

    #[test]
    fn test_page_sizes_change_pagination() {
        let text: String = (0..120).map(|i| format!("line {}\n", i)).collect();
        let lines = classify_text(&text);
        let pages_for = |page_size| {
            let opts = ConversionOptions {
                page_size,
                ..Default::default()
            };
            page_count(&render_pdf("Sizes", &lines, &opts).unwrap())
        };
        assert!(pages_for(PageSize::Legal) < pages_for(PageSize::Letter));
    }

    #[test]
    fn test_empty_document() {
        let bytes = render_pdf("Empty", &[], &ConversionOptions::default()).unwrap();
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_missing_font_file_fails() {
        let options = ConversionOptions {
            font: Some("no/such/font.ttf".into()),
            ..Default::default()
        };
        let err = render_pdf("T", &classify_text("text"), &options).unwrap_err();
        assert!(matches!(err, ConvertError::Font { .. }));
    }

    #[test]
    fn test_line_kinds_sources() {
        let doc = parse_markdown("T", "# Title\n\nA &amp; B\n");
        assert_eq!(
            line_kinds(&doc, TextSource::Tree),
            vec![
                LineKind::Heading {
                    level: 1,
                    text: "Title".to_string()
                },
                LineKind::Blank,
                LineKind::Paragraph("A & B".to_string()),
            ]
        );

        // Stripped HTML has lost the heading marker.
        let html_lines = line_kinds(&doc, TextSource::Html);
        assert_eq!(html_lines[0], LineKind::Paragraph("Title".to_string()));
        assert!(html_lines.contains(&LineKind::Paragraph("A & B".to_string())));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let doc = parse_markdown("T", "text");
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("missing-dir").join("out.pdf");
        let err = PdfOutputPlugin
            .convert(&doc, &output, &ConversionOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Write { .. }));
        assert!(!output.exists());
    }
}
