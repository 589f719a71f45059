//! Plain-text extraction from parsed HTML.

use std::sync::LazyLock;

use scraper::{Html, Node, Selector};

/// Placeholder title for pages without a usable `<title>`.
pub const NO_TITLE: &str = "No title";

/// Marker appended to truncated content.
const ELLIPSIS: &str = "...";

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector"));

/// Elements whose text never counts as page content.
fn is_non_content(name: &str) -> bool {
    matches!(name, "script" | "style")
}

/// Flatten every text node outside `<script>`/`<style>` into one string.
///
/// Lines are trimmed, split on double spaces, and the non-empty chunks are
/// joined with single spaces.
pub fn extract_text(doc: &Html) -> String {
    let mut raw = String::new();

    for node in doc.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| is_non_content(el.name()))
        });
        if !hidden {
            raw.push_str(text);
        }
    }

    raw.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The document `<title>`, or [`NO_TITLE`] if missing or blank.
pub fn extract_title(doc: &Html) -> String {
    doc.select(&TITLE_SEL)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Keep at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &text[..byte_idx]),
        None => text.to_string(),
    }
}
