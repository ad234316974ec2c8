// src/extract/mod.rs
// =============================================================================
// Page content extraction.
//
// Submodules:
// - tokens: page bytes -> HTML token stream (html5ever tokenizer)
// - page: token stream -> title, paragraph text and outbound links
// =============================================================================

mod page;
mod tokens;

pub use page::{extract_page, ExtractionResult};
pub use tokens::{tokenize, HtmlToken, TokenStream};

use url::Url;

use crate::error::TokenizeError;

// Convenience for the crawler: tokenize and extract in one go
pub fn extract_html(page_url: &Url, page: &[u8]) -> Result<ExtractionResult, TokenizeError> {
    extract_page(page_url, tokenize(page))
}
