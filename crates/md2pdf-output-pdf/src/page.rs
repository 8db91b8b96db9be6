//! Page builder: places lines of embedded-font text top to bottom and starts
//! a new page when the bottom margin is reached.
//!
//! Every line is positioned with an absolute text matrix, so a line's place
//! on the page never depends on the lines before it.

use md2pdf_core::classify::BULLET_PREFIX;
use md2pdf_core::options::PageSize;
use printpdf::*;

use crate::fonts::{Fonts, MM_PER_PT};

/// Margins in mm.
pub const MARGIN: f32 = 25.0;

/// Line height multiplier.
const LINE_HEIGHT: f32 = 1.4;

pub struct PageBuilder<'a> {
    fonts: &'a Fonts,
    width: f32,
    height: f32,
    pages: Vec<PdfPage>,
    current_ops: Vec<Op>,
    y_pos: f32, // mm from bottom
    in_text: bool,
    /// Font size and weight last set on the current page.
    font: Option<(f32, bool)>,
}

impl<'a> PageBuilder<'a> {
    pub fn new(page_size: PageSize, fonts: &'a Fonts) -> Self {
        let (width, height) = page_size.dimensions_mm();
        let mut pb = PageBuilder {
            fonts,
            width,
            height,
            pages: Vec::new(),
            current_ops: Vec::new(),
            y_pos: height - MARGIN,
            in_text: false,
            font: None,
        };
        pb.start_text();
        pb
    }

    fn start_text(&mut self) {
        if !self.in_text {
            self.current_ops.push(Op::StartTextSection);
            self.in_text = true;
        }
    }

    fn end_text(&mut self) {
        if self.in_text {
            self.current_ops.push(Op::EndTextSection);
            self.in_text = false;
        }
    }

    fn new_page(&mut self) {
        self.end_text();
        let ops = std::mem::take(&mut self.current_ops);
        self.pages.push(PdfPage::new(Mm(self.width), Mm(self.height), ops));
        self.y_pos = self.height - MARGIN;
        self.font = None;
        self.start_text();
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        if self.y_pos - needed_mm < MARGIN {
            self.new_page();
        }
    }

    /// Move the cursor down by `mm`. Space running past the bottom margin
    /// is dropped rather than carried to the next page.
    pub fn advance(&mut self, mm: f32) {
        self.y_pos = (self.y_pos - mm).max(MARGIN);
    }

    /// Horizontal room for text after `indent_mm`, in mm.
    pub fn usable_width_mm(&self, indent_mm: f32) -> f32 {
        (self.width - 2.0 * MARGIN - indent_mm).max(0.0)
    }

    fn set_font(&mut self, font_size: f32, bold: bool) {
        if self.font != Some((font_size, bold)) {
            self.current_ops.push(Op::SetFontSize {
                size: Pt(font_size),
                font: self.fonts.face(bold).id.clone(),
            });
            self.font = Some((font_size, bold));
        }
    }

    pub fn write_line(&mut self, text: &str, font_size: f32, bold: bool, indent_mm: f32) {
        let line_h = font_size * LINE_HEIGHT * MM_PER_PT;
        self.ensure_space(line_h);
        self.set_font(font_size, bold);

        let baseline = self.y_pos - font_size * MM_PER_PT;
        self.current_ops.push(Op::SetTextMatrix {
            matrix: TextMatrix::Translate(Mm(MARGIN + indent_mm).into(), Mm(baseline).into()),
        });
        self.current_ops.push(Op::WriteText {
            items: vec![TextItem::Text(text.to_string())],
            font: self.fonts.face(bold).id.clone(),
        });

        self.y_pos -= line_h;
    }

    /// Wrap `text` to the usable width and write each resulting line.
    /// Continuation lines of a bullet hang under the bullet text.
    pub fn write_wrapped(&mut self, text: &str, font_size: f32, bold: bool, indent_mm: f32) {
        let fonts = self.fonts;
        let face = fonts.face(bold);
        let (marker, body) = match text.strip_prefix(BULLET_PREFIX) {
            Some(rest) => (BULLET_PREFIX, rest),
            None => ("", text),
        };
        let hang = face.width_mm(marker, font_size);
        let max_width = self.usable_width_mm(indent_mm + hang);

        let lines = wrap_text(body, max_width, |s| face.width_mm(s, font_size));
        for (i, line) in lines.into_iter().enumerate() {
            if i == 0 {
                self.write_line(&format!("{}{}", marker, line), font_size, bold, indent_mm);
            } else {
                self.write_line(&line, font_size, bold, indent_mm + hang);
            }
        }
    }

    pub fn finish(mut self) -> Vec<PdfPage> {
        self.end_text();
        let ops = std::mem::take(&mut self.current_ops);
        // Keep a first page even for empty documents.
        if self.pages.is_empty() || ops.len() > 2 {
            self.pages.push(PdfPage::new(Mm(self.width), Mm(self.height), ops));
        }
        self.pages
    }
}

/// Greedy wrap on whitespace so no line measures wider than `max_width`.
/// A word wider than a whole line is broken between characters, which is
/// also how unspaced CJK runs wrap.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() {
            let candidate = format!("{} {}", line, word);
            if measure(&candidate) <= max_width {
                line = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut line));
        }

        if measure(word) <= max_width {
            line.push_str(word);
            continue;
        }
        for c in word.chars() {
            line.push(c);
            if line.chars().count() > 1 && measure(&line) > max_width {
                line.pop();
                lines.push(std::mem::replace(&mut line, c.to_string()));
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One unit of width per character.
    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    fn fonts() -> Fonts {
        let mut doc = PdfDocument::new("page");
        Fonts::load(&mut doc, &Default::default()).unwrap()
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("aa bb cc dd", 5.0, chars), vec!["aa bb", "cc dd"]);
        assert_eq!(wrap_text("  spaced   out  ", 80.0, chars), vec!["spaced out"]);
        assert!(wrap_text("   ", 10.0, chars).is_empty());
    }

    #[test]
    fn test_wrap_counts_chars_not_bytes() {
        assert_eq!(wrap_text("één twee drie", 8.0, chars), vec!["één twee", "drie"]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        assert_eq!(
            wrap_text("tiny enormousword x", 5.0, chars),
            vec!["tiny", "enorm", "ouswo", "rd x"]
        );
        assert_eq!(wrap_text("漢字漢字漢字漢", 3.0, chars), vec!["漢字漢", "字漢字", "漢"]);
    }

    #[test]
    fn test_wrap_keeps_single_char_wider_than_line() {
        assert_eq!(wrap_text("ab", 0.5, chars), vec!["a", "b"]);
    }

    #[test]
    fn test_usable_width_shrinks_with_indent() {
        let fonts = fonts();
        let a4 = PageBuilder::new(PageSize::A4, &fonts);
        assert_eq!(a4.usable_width_mm(0.0), 210.0 - 2.0 * MARGIN);
        assert!(a4.usable_width_mm(5.0) < a4.usable_width_mm(0.0));
        let letter = PageBuilder::new(PageSize::Letter, &fonts);
        assert!(letter.usable_width_mm(0.0) > a4.usable_width_mm(0.0));
    }

    #[test]
    fn test_lines_use_absolute_positions() {
        let fonts = fonts();
        let mut pb = PageBuilder::new(PageSize::A4, &fonts);
        pb.write_line("one", 12.0, false, 0.0);
        pb.write_line("two", 12.0, false, 5.0);
        let ops = &pb.current_ops;
        assert!(!ops.iter().any(|op| matches!(op, Op::SetTextCursor { .. })));
        let origins: Vec<(f32, f32)> = ops
            .iter()
            .filter_map(|op| match op {
                Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(x, y),
                } => Some((x.0, y.0)),
                _ => None,
            })
            .collect();
        assert_eq!(origins.len(), 2);
        assert!(origins[1].0 > origins[0].0);
        assert!(origins[1].1 < origins[0].1);
    }

    #[test]
    fn test_font_set_once_per_style() {
        let fonts = fonts();
        let mut pb = PageBuilder::new(PageSize::A4, &fonts);
        pb.write_line("a", 12.0, false, 0.0);
        pb.write_line("b", 12.0, false, 0.0);
        pb.write_line("c", 20.0, true, 0.0);
        let sizes: Vec<(f32, &FontId)> = pb
            .current_ops
            .iter()
            .filter_map(|op| match op {
                Op::SetFontSize { size, font } => Some((size.0, font)),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![(12.0, &fonts.regular.id), (20.0, &fonts.bold.id)]);
    }

    #[test]
    fn test_paginates() {
        let fonts = fonts();
        let mut pb = PageBuilder::new(PageSize::A4, &fonts);
        for i in 0..200 {
            pb.write_line(&format!("line {}", i), 12.0, false, 0.0);
        }
        assert!(pb.finish().len() > 1);
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let fonts = fonts();
        assert_eq!(PageBuilder::new(PageSize::Legal, &fonts).finish().len(), 1);
    }
}
