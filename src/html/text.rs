//! Text content helpers: escaping and run tag selection.

use crate::types::{TextRun, TypeStyle};

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// [`escape_html`] with line breaks written as character references, so
/// markup indentation never lands inside `pre-wrap` text.
pub fn escape_text(text: &str) -> String {
    escape_html(text).replace('\r', "&#13;").replace('\n', "&#10;")
}

fn has_feature(style: &TypeStyle, feature: &str) -> bool {
    style.opentype_flags.get(feature).is_some_and(|flag| *flag > 0)
}

/// `sub`/`sup` for runs with the SUBS/SUPS OpenType features, `span` otherwise.
pub fn run_tag(run: &TextRun) -> &'static str {
    match &run.style {
        Some(style) if has_feature(style, "SUBS") => "sub",
        Some(style) if has_feature(style, "SUPS") => "sup",
        _ => "span",
    }
}

pub fn has_line_break(text: &str) -> bool {
    text.contains('\n') || text.contains('\u{2028}')
}

/// Add `indent` spaces before every non-blank line.
pub fn indent_string(text: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
