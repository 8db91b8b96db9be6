//! The parsed input handed from the input plugin to an output plugin.

use crate::classify::LineKind;

/// A Markdown document after parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDocument {
    /// Document title, usually the input file stem.
    pub title: String,
    /// HTML fragment rendered from the Markdown (no `<html>`/`<body>`).
    pub html: String,
    /// Lines flattened from the Markdown event stream, each already tagged
    /// with the block it came from.
    pub outline: Vec<LineKind>,
}

impl SourceDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}
