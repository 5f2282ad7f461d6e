//! Plain-text extraction from HTML

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose content is never page text
const SKIP_TAGS: &[&str] = &[
    "head", "title", "script", "style", "noscript", "template", "svg", "iframe",
];

/// Elements that start and end a line of output
const BLOCK_TAGS: &[&str] = &[
    "html", "body", "p", "div", "section", "article", "header", "footer", "nav", "aside", "main",
    "ul", "ol", "li", "dl", "dt", "dd", "table", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5",
    "h6", "blockquote", "figure", "figcaption", "form", "br", "hr", "pre",
];

/// Page title with whitespace collapsed, if present and non-empty
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?;
    let title = collapse_whitespace(&title.text().collect::<String>());
    (!title.is_empty()).then_some(title)
}

/// Visible text of an HTML page, one block element per line.
///
/// Entities are decoded by the parser. `pre`/`code` content is flattened
/// onto a single line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether content looks like an HTML document
pub fn looks_like_html(content: &str) -> bool {
    let head: String = content.chars().take(512).collect::<String>().to_ascii_lowercase();
    head.contains("<html") || head.contains("<!doctype html") || head.contains("<body")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let tag = el.name();
                if SKIP_TAGS.contains(&tag) {
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };

                if matches!(tag, "pre" | "code") {
                    let flat = collapse_whitespace(&child.text().collect::<String>());
                    let sep = if tag == "pre" { '\n' } else { ' ' };
                    out.push(sep);
                    out.push_str(&flat);
                    out.push(sep);
                } else if BLOCK_TAGS.contains(&tag) {
                    out.push('\n');
                    collect_text(child, out);
                    out.push('\n');
                } else {
                    collect_text(child, out);
                }
            }
            // comments, doctype, processing instructions
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
