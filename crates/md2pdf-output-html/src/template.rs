//! Standalone HTML page wrapped around the rendered Markdown.

use md2pdf_core::classify::heading_font_size;
use md2pdf_core::options::PageSize;
use md2pdf_utils::html::escape_html_text;

/// Wrap `body_html` in a styled page. Body text uses `font_size` points and
/// h1-h4 scale up from it.
pub fn render_page(title: &str, body_html: &str, font_size: f32, page_size: PageSize) -> String {
    let h = |level| heading_font_size(font_size, level);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        @page {{ size: {page}; }}
        body {{
            font-family: "Hiragino Sans", "Hiragino Kaku Gothic ProN", "Noto Sans JP", sans-serif;
            font-size: {body}pt;
            line-height: 1.6;
            max-width: 800px;
            margin: 40px auto;
            padding: 0 20px;
        }}
        h1 {{ font-size: {h1}pt; margin-top: 20px; }}
        h2 {{ font-size: {h2}pt; margin-top: 18px; }}
        h3 {{ font-size: {h3}pt; margin-top: 16px; }}
        h4 {{ font-size: {h4}pt; margin-top: 14px; font-weight: bold; }}
        ul, ol {{
            margin-left: 20px;
            padding-left: 20px;
        }}
        li {{ margin-bottom: 4px; }}
        p {{
            margin: 8px 0;
            word-wrap: break-word;
        }}
        code {{
            background-color: #f4f4f4;
            padding: 2px 4px;
        }}
        pre {{
            background-color: #f4f4f4;
            padding: 10px;
            white-space: pre-wrap;
        }}
        table {{ border-collapse: collapse; }}
        th, td {{ border: 1px solid #ccc; padding: 4px 8px; }}
    </style>
</head>
<body>
{content}
</body>
</html>
"#,
        title = escape_html_text(title),
        page = page_size.name(),
        body = font_size,
        h1 = h(1),
        h2 = h(2),
        h3 = h(3),
        h4 = h(4),
        content = body_html,
    )
}
