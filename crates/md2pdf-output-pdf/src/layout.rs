//! Turns typed layout lines into styled cells.

use md2pdf_core::classify::{heading_font_size, LineKind};

/// Vertical advance for an empty source line, in mm.
pub const BLANK_LINE_MM: f32 = 3.0;
/// Extra space below a heading, in mm.
pub const HEADING_SPACING_MM: f32 = 2.0;
/// Left indent of bullet items, in mm.
pub const BULLET_INDENT_MM: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Move the cursor down without drawing.
    Space(f32),
    Text(TextCell),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextCell {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub indent_mm: f32,
    pub space_after_mm: f32,
}

impl TextCell {
    fn body(text: String, font_size: f32, indent_mm: f32) -> Self {
        Self {
            text,
            font_size,
            bold: false,
            indent_mm,
            space_after_mm: 0.0,
        }
    }
}

/// Produce the cells to draw for `lines`, in order.
pub fn layout_lines(lines: &[LineKind], base_font_size: f32) -> Vec<Cell> {
    lines
        .iter()
        .cloned()
        .map(|line| layout_line(line, base_font_size))
        .collect()
}

fn layout_line(line: LineKind, base_font_size: f32) -> Cell {
    match line {
        LineKind::Blank => Cell::Space(BLANK_LINE_MM),
        LineKind::Heading { text, .. } if text.is_empty() => Cell::Space(HEADING_SPACING_MM),
        LineKind::Heading { level, text } => Cell::Text(TextCell {
            text,
            font_size: heading_font_size(base_font_size, level),
            bold: true,
            indent_mm: 0.0,
            space_after_mm: HEADING_SPACING_MM,
        }),
        LineKind::Bullet(text) => Cell::Text(TextCell::body(text, base_font_size, BULLET_INDENT_MM)),
        LineKind::Paragraph(text) => Cell::Text(TextCell::body(text, base_font_size, 0.0)),
    }
}
