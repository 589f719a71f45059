//! Markdown table rendering and parsing for insight reports.
//!
//! The report is a three-column pipe table. This crate renders it from rows,
//! parses model-produced tables back into cells (tolerating fences, prose,
//! and separator variants), and splits "Recommended Source" cells into a
//! name and a URL for hyperlinked display.

mod cleanup;
mod table;

pub use table::{
    MarkdownTable, SourceCell, escape_cell, format_source_cell, parse_table, render_table,
    split_row, split_source_cell,
};

/// Strip surrounding code-fence lines from a model response.
pub fn strip_code_fence(text: &str) -> String {
    cleanup::strip_code_fences(text.trim()).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_code_fence_json() {
        let raw = "```json\n{\"relevance_score\": 7}\n```";
        assert_eq!(strip_code_fence(raw), "{\"relevance_score\": 7}");
    }

    #[test]
    fn strip_code_fence_plain_text_untouched() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }
}
