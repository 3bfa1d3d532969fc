//! Article fetching: one retried GET per article URL, then paragraph text
//! extraction with `scraper`.
//!
//! - [`extract`] - pure HTML → text, no I/O
//! - [`fetcher`] - retry, quality floor, and pacing between articles

mod extract;
mod fetcher;

pub use extract::{extract_paragraph_text, normalize_whitespace};
pub use fetcher::ArticleFetcher;
