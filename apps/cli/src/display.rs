//! Terminal rendering of report tables and discovered links.

use acctintel_markdown::{MarkdownTable, SourceCell, parse_table, render_table, split_source_cell};
use acctintel_shared::DiscoveredLink;

const SOURCE_COLUMN: &str = "Recommended Source";

/// `Category: text (url)` lines for the first `max` links.
pub(crate) fn link_lines(links: &[DiscoveredLink], max: usize) -> Vec<String> {
    links
        .iter()
        .take(max)
        .map(|l| format!("{}: {} ({})", l.category, l.display_text, l.url))
        .collect()
}

/// Wrap `text` in an OSC 8 terminal hyperlink to `url`.
fn hyperlink(text: &str, url: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\{text}\x1b]8;;\x1b\\")
}

/// A cell as displayed, plus its visible width.
struct Cell {
    rendered: String,
    width: usize,
}

impl Cell {
    fn plain(text: &str) -> Self {
        Self {
            rendered: text.to_string(),
            width: text.chars().count(),
        }
    }

    fn source(text: &str) -> Self {
        match split_source_cell(text) {
            SourceCell::Link { name, url } => Self {
                width: name.chars().count(),
                rendered: hyperlink(&name, &url),
            },
            SourceCell::Plain(text) => Self::plain(&text),
        }
    }
}

/// Aligned columns with linked source names; the raw markdown if it does not parse.
pub(crate) fn terminal_report(markdown: &str) -> String {
    match parse_table(markdown) {
        Ok(table) => aligned_table(&table),
        Err(_) => markdown.to_string(),
    }
}

fn aligned_table(table: &MarkdownTable) -> String {
    let source_col = table.column(SOURCE_COLUMN);

    let header: Vec<Cell> = table.headers.iter().map(|h| Cell::plain(h)).collect();
    let body: Vec<Vec<Cell>> = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, c)| {
                    if Some(i) == source_col {
                        Cell::source(c)
                    } else {
                        Cell::plain(c)
                    }
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|c| c.width).collect();
    for row in &body {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width);
        }
    }

    let line = |cells: &[Cell]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{}{}", c.rendered, " ".repeat(w - c.width)))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(&header)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(body.iter().map(|row| line(row)));
    out.join("\n")
}

/// The table with sources rewritten as `[name](url)` markdown links.
pub(crate) fn markdown_report(markdown: &str) -> String {
    let Ok(table) = parse_table(markdown) else {
        return markdown.to_string();
    };
    let source_col = table.column(SOURCE_COLUMN);
    let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, c)| {
                    if Some(i) == source_col {
                        split_source_cell(c).to_markdown()
                    } else {
                        c.clone()
                    }
                })
                .collect()
        })
        .collect();
    render_table(&headers, &rows)
}
