//! Pipe-delimited markdown tables.
//!
//! Rendering escapes literal pipes as `\|` and flattens newlines so every
//! cell survives a split on unescaped `|`. Parsing accepts tables with or
//! without outer pipes and discards separator rows.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use acctintel_shared::{AcctIntelError, Result};

use crate::cleanup;

/// A parsed markdown table. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MarkdownTable {
    /// Index of the header equal to `name` (case-insensitive).
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Make text safe to place inside a single table cell.
pub fn escape_cell(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
        .replace('|', "\\|")
        .trim()
        .to_string()
}

/// Render a header row, separator, and one line per row.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);

    lines.push(format!("| {} |", headers.join(" | ")));
    lines.push(format!("|{}", "---|".repeat(headers.len())));

    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Matches separator rows such as `|---|:--:|---|` or `--- | ---`.
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?\s*$").expect("separator regex")
});

/// Split one table line into trimmed cells, honouring `\|` escapes.
pub fn split_row(line: &str) -> Vec<String> {
    let mut body = line.trim();
    if let Some(rest) = body.strip_prefix('|') {
        body = rest;
    }
    if body.ends_with('|') && !body.ends_with("\\|") {
        body = &body[..body.len() - 1];
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);

    cells.into_iter().map(|c| c.trim().to_string()).collect()
}

/// Parse the first markdown table found in `text`.
///
/// Non-table prose and code fences around the table are ignored. Short rows
/// are padded with empty cells and long rows truncated to the header width.
pub fn parse_table(text: &str) -> Result<MarkdownTable> {
    let cleaned = cleanup::run_pipeline(text);
    let mut lines = cleaned.lines();

    let header_line = lines
        .next()
        .ok_or_else(|| AcctIntelError::parse("markdown table", "no table lines found"))?;
    if SEPARATOR_RE.is_match(header_line) {
        return Err(AcctIntelError::parse("markdown table", "starts with a separator row"));
    }

    let headers = split_row(header_line);
    let width = headers.len();

    let rows: Vec<Vec<String>> = lines
        .filter(|line| !SEPARATOR_RE.is_match(line))
        .map(|line| {
            let mut cells = split_row(line);
            cells.resize(width, String::new());
            cells
        })
        .collect();

    debug!(columns = width, rows = rows.len(), "parsed markdown table");

    Ok(MarkdownTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Source cells
// ---------------------------------------------------------------------------

/// A "Recommended Source" cell, split for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCell {
    /// `"<name> - <url>"`, renderable as a hyperlink.
    Link { name: String, url: String },
    /// Anything else, shown as-is.
    Plain(String),
}

impl SourceCell {
    /// Markdown rendering: `[name](url)` for links, text otherwise.
    pub fn to_markdown(&self) -> String {
        match self {
            Self::Link { name, url } => format!("[{name}]({url})"),
            Self::Plain(text) => text.clone(),
        }
    }
}

/// Format a source name and URL as a `"<name> - <url>"` cell.
pub fn format_source_cell(name: &str, url: &str) -> String {
    format!("{name} - {url}")
}

/// Split on the first `" - http"`; other cells stay plain text.
pub fn split_source_cell(cell: &str) -> SourceCell {
    match cell.split_once(" - http") {
        Some((name, rest)) => SourceCell::Link {
            name: name.trim().to_string(),
            url: format!("http{}", rest.trim()),
        },
        None => SourceCell::Plain(cell.to_string()),
    }
}
