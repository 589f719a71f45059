//! Cleanup passes applied to model-produced markdown before table parsing.
//!
//! Each pass is a function `&str -> String` applied in sequence. Models often
//! wrap the table in a code fence or surround it with prose; both are removed
//! so only pipe-delimited lines reach the parser.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on raw markdown text.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = md.to_string();

    result = normalize_line_endings(&result);
    result = strip_code_fences(&result);
    result = keep_table_lines(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Line endings
// ---------------------------------------------------------------------------

fn normalize_line_endings(md: &str) -> String {
    md.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Code fences
// ---------------------------------------------------------------------------

/// Drop fence lines (```` ``` ````, ```` ```markdown ````, `~~~`), keeping their contents.
pub(crate) fn strip_code_fences(md: &str) -> String {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*(```|~~~)[\w-]*\s*$").expect("valid regex"));

    md.lines()
        .filter(|line| !FENCE_RE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 3: Table lines
// ---------------------------------------------------------------------------

/// Keep only non-blank lines containing a pipe.
fn keep_table_lines(md: &str) -> String {
    md.lines()
        .filter(|line| !line.trim().is_empty() && line.contains('|'))
        .collect::<Vec<_>>()
        .join("\n")
}
