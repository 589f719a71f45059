//! Page fetching and plain-text extraction.
//!
//! This crate provides:
//! - [`Fetcher`]: single-GET page fetcher that never fails outward
//! - [`extract`]: script/style-free text flattening and `<title>` lookup
//! - [`normalize_input_url`]: scheme defaulting for user-typed URLs

pub mod extract;
pub mod fetch;

pub use extract::{NO_TITLE, extract_text, extract_title, truncate_chars};
pub use fetch::{Fetcher, normalize_input_url};
