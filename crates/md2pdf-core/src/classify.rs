//! Prefix-based line classifier.
//!
//! Infers heading and bullet structure from flattened text lines: leading
//! `#` characters mark a heading, a leading `- ` or `* ` marks a bullet
//! item, and anything else is a paragraph.

/// Glyph and padding that replace a `- `/`* ` bullet marker.
pub const BULLET_PREFIX: &str = "\u{2022}  ";

/// Heading levels at or above this render at the body font size.
pub const HEADING_FLOOR_LEVEL: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Heading { level: usize, text: String },
    /// Bullet text with the marker already replaced by [`BULLET_PREFIX`].
    Bullet(String),
    Paragraph(String),
}

/// Classify one line of flattened text. Surrounding whitespace is ignored.
pub fn classify_line(line: &str) -> LineKind {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    let level = line.chars().take_while(|&c| c == '#').count();
    if level > 0 {
        return LineKind::Heading {
            level,
            text: line[level..].trim().to_string(),
        };
    }

    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
    {
        return LineKind::Bullet(format!("{}{}", BULLET_PREFIX, rest.trim_start()));
    }

    LineKind::Paragraph(line.to_string())
}

/// Classify every line of `text`.
pub fn classify_text(text: &str) -> Vec<LineKind> {
    text.lines().map(classify_line).collect()
}

/// Font size for a heading of `level`, never smaller than `base`.
///
/// Each level above the floor adds 2pt: with a 12pt base, h1 is 20pt and
/// h5 and deeper stay at 12pt.
pub fn heading_font_size(base: f32, level: usize) -> f32 {
    let steps = HEADING_FLOOR_LEVEL.saturating_sub(level) as f32;
    (base + steps * 2.0).max(base)
}
