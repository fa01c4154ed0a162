//! Derivation of the HTML and plain-text renditions from report markdown.
//!
//! This is a small line/regex-level dialect, not CommonMark. Rules run in a
//! fixed order and later rules rely on earlier ones having consumed their
//! syntax: images before links, bold before italics.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref H1: Regex = Regex::new(r"(?m)^# (.+)$").unwrap();
    static ref H2: Regex = Regex::new(r"(?m)^## (.+)$").unwrap();
    static ref H3: Regex = Regex::new(r"(?m)^### (.+)$").unwrap();
    static ref IMAGE: Regex = Regex::new(r"!\[([^\]]*)\]\((https?://[^\s)]+)\)").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*([^*]+)\*\*").unwrap();
    static ref HTTP_LINK: Regex = Regex::new(r"\[([^\]]+)\]\((https?://[^\s)]+)\)").unwrap();
    static ref BULLET: Regex = Regex::new(r"(?m)^- (.+)$").unwrap();
    static ref RULE: Regex = Regex::new(r"(?m)^---+$").unwrap();
    static ref ANY_LINK: Regex = Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap();
    static ref FORMATTING: Regex = Regex::new(r"[*_`#]+").unwrap();
}

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
               max-width: 800px; margin: 0 auto; padding: 20px; line-height: 1.6; }
        h1, h2, h3 { color: #333; }
        a { color: #0066cc; }
        li { margin: 8px 0; }
        hr { border: none; border-top: 1px solid #ddd; margin: 20px 0; }
        img { max-width: 100%; height: auto; border-radius: 8px; }
    </style>
</head>
<body>
"#;

const HTML_TAIL: &str = "\n</body>\n</html>";

/// Render report markdown as a standalone HTML document.
pub fn markdown_to_html(markdown: &str) -> String {
    let html = H1.replace_all(markdown, "<h1>${1}</h1>");
    let html = H2.replace_all(&html, "<h2>${1}</h2>");
    let html = H3.replace_all(&html, "<h3>${1}</h3>");
    let html = IMAGE.replace_all(
        &html,
        r#"<img src="${2}" alt="${1}" style="max-width: 100%; height: auto; margin: 10px 0;">"#,
    );
    let html = BOLD.replace_all(&html, "<strong>${1}</strong>");
    let html = HTTP_LINK.replace_all(&html, r#"<a href="${2}">${1}</a>"#);
    let html = convert_italics(&html);
    let html = BULLET.replace_all(&html, "<li>${1}</li>");
    let html = RULE.replace_all(&html, "<hr>");

    let body = html
        .split('\n')
        .map(|line| {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('<') {
                format!("<p>{}</p>", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{}{}", HTML_HEAD, body, HTML_TAIL)
}

/// Render report markdown as plain text: link targets and emphasis markers go away.
pub fn markdown_to_text(markdown: &str) -> String {
    let text = ANY_LINK.replace_all(markdown, "${1}");
    let text = FORMATTING.replace_all(&text, "");
    let text = RULE.replace_all(&text, "");
    text.trim().to_string()
}

/// Wrap `*text*` spans in `<em>`.
///
/// A span opens on a `*` not preceded by another `*`, runs over at least one
/// character that is neither `*` nor a newline, and closes on a `*` not
/// followed by another `*`.
fn convert_italics(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '*' && (i == 0 || chars[i - 1] != '*') {
            if let Some(close) = italic_close(&chars, i) {
                out.push_str("<em>");
                out.extend(&chars[i + 1..close]);
                out.push_str("</em>");
                i = close + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

fn italic_close(chars: &[char], open: usize) -> Option<usize> {
    let offset = chars[open + 1..]
        .iter()
        .position(|c| *c == '*' || *c == '\n')?;
    let close = open + 1 + offset;
    if offset == 0 || chars[close] != '*' || chars.get(close + 1) == Some(&'*') {
        return None;
    }
    Some(close)
}
