//! Naive HTML-to-text reduction and escaping.
//!
//! This is not an HTML parser. Tag removal tracks a single "inside a tag"
//! flag, so a `>` inside an attribute value ends the tag early, and only
//! five entities are understood.

/// Entities decoded by [`decode_entities`], in replacement order.
const ENTITIES: [(&str, &str); 5] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Remove every `<...>` span and decode the basic entities.
///
/// `"<p>A &amp; B</p>"` becomes `"A & B"`.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    decode_entities(&text)
}

/// Decode `&lt;`, `&gt;`, `&amp;`, `&quot;` and `&#39;`. Anything else is
/// left untouched.
pub fn decode_entities(s: &str) -> String {
    ENTITIES
        .iter()
        .fold(s.to_string(), |acc, (entity, literal)| acc.replace(entity, literal))
}

/// Escape text for use inside an HTML element.
pub fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
