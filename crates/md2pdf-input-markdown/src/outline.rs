//! Flattening of the Markdown event stream into typed layout lines.
//!
//! Structure comes from the parser, never from the text: a code line that
//! starts with `#` or `- ` stays a paragraph, and so does an escaped `\#`.
//! Ordered items keep their `3. ` number as text. Inline styling is dropped
//! and nested lists lose their indentation.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

use md2pdf_core::classify::{LineKind, BULLET_PREFIX};
use md2pdf_utils::html::strip_html;

use crate::markdown_options;

/// Flatten Markdown into layout lines.
pub fn flatten_outline(markdown: &str) -> Vec<LineKind> {
    let mut flattener = Flattener::default();
    for event in Parser::new_ext(markdown, markdown_options()) {
        flattener.event(event);
    }
    flattener.finish()
}

/// Kind of the line being accumulated in `Flattener::current`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Pending {
    #[default]
    Text,
    Heading(usize),
    Bullet,
}

#[derive(Default)]
struct Flattener {
    lines: Vec<LineKind>,
    current: String,
    kind: Pending,
    /// Next item number per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    row: Vec<String>,
    in_code: bool,
}

impl Flattener {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Code(text) => {
                if self.in_code {
                    self.push_multiline(&text);
                } else {
                    self.current.push_str(&text);
                }
            }
            Event::Html(html) => self.push_multiline(&strip_html(&html)),
            Event::InlineHtml(html) => self.current.push_str(&strip_html(&html)),
            Event::FootnoteReference(label) => {
                self.current.push('[');
                self.current.push_str(&label);
                self.current.push(']');
            }
            Event::TaskListMarker(checked) => {
                self.current.push_str(if checked { "[x] " } else { "[ ] " });
            }
            Event::SoftBreak => self.current.push(' '),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.blank();
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.kind = Pending::Heading(heading_depth(level));
            }
            Tag::Paragraph => {
                if !self.lists.is_empty() && !self.current.is_empty() && !self.current.ends_with(' ') {
                    self.current.push(' ');
                }
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                match self.lists.last_mut() {
                    Some(Some(n)) => {
                        self.current = format!("{}. ", n);
                        *n += 1;
                    }
                    _ => self.kind = Pending::Bullet,
                }
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code = true;
            }
            Tag::Table(_) | Tag::TableHead | Tag::TableRow => {
                self.flush();
                self.row.clear();
            }
            Tag::TableCell => self.current.clear(),
            Tag::FootnoteDefinition(label) => {
                self.flush();
                self.current = format!("[{}]: ", label);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) | TagEnd::CodeBlock | TagEnd::HtmlBlock => {
                self.in_code = false;
                self.flush();
                self.blank();
            }
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.flush();
                    self.blank();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.current);
                self.row.push(cell.trim().to_string());
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                let row = std::mem::take(&mut self.row);
                self.lines.push(LineKind::Paragraph(row.join(" | ")));
            }
            TagEnd::Table => self.blank(),
            TagEnd::FootnoteDefinition => self.flush(),
            _ => {}
        }
    }

    /// Append text that may span several lines, breaking at each newline.
    fn push_multiline(&mut self, text: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.flush();
            }
            self.current.push_str(part);
        }
    }

    fn flush(&mut self) {
        let line = std::mem::take(&mut self.current);
        let kind = std::mem::take(&mut self.kind);
        if line.trim().is_empty() {
            return;
        }
        self.lines.push(match kind {
            Pending::Heading(level) => LineKind::Heading {
                level,
                text: line.trim().to_string(),
            },
            Pending::Bullet => LineKind::Bullet(format!("{}{}", BULLET_PREFIX, line.trim())),
            // Code keeps its indentation.
            Pending::Text => LineKind::Paragraph(line.trim_end().to_string()),
        });
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| *l != LineKind::Blank) {
            self.lines.push(LineKind::Blank);
        }
    }

    fn finish(mut self) -> Vec<LineKind> {
        self.flush();
        while self.lines.last() == Some(&LineKind::Blank) {
            self.lines.pop();
        }
        self.lines
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
