// src/extract/page.rs
// =============================================================================
// Walks an HTML token stream and pulls out what the indexer wants:
// - the page title
// - body text, but only text inside <p> elements
// - every <a href>, resolved to an absolute URL and deduplicated
//
// The extractor is a two-flag state machine:
//
//   inside_title      set by <title>, cleared by </title>
//   inside_paragraph  set by <p>,     cleared by </p>
//
// Text before the first <p> is skipped. Title text wins over paragraph text
// if both flags happen to be set.
// =============================================================================

use std::collections::HashSet;

use tracing::warn;
use url::Url;

use super::tokens::HtmlToken;
use crate::error::{TokenizeError, UrlError};

// What we pulled out of one page, before cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub title: String,
    /// Lowercased, whitespace-collapsed text runs from inside <p>
    pub body_fragments: Vec<String>,
    /// Absolute URLs in first-seen order, no duplicates
    pub links: Vec<String>,
}

impl ExtractionResult {
    // Keeps only ASCII letters, digits and spaces in each fragment and joins
    // the fragments with single spaces
    pub fn cleaned_body(&self) -> String {
        self.body_fragments
            .iter()
            .map(|fragment| {
                fragment
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// Runs the extractor over a token stream
//
// Parameters:
//   page_url: the URL the page was fetched from, for resolving relative links
//   tokens: the tokenizer's output
//
// Stops at EndOfStream. A token error aborts the page; nothing partial is
// returned.
pub fn extract_page<I>(page_url: &Url, tokens: I) -> Result<ExtractionResult, TokenizeError>
where
    I: IntoIterator<Item = Result<HtmlToken, TokenizeError>>,
{
    let mut extractor = PageExtractor::new(page_url);
    for token in tokens {
        match token? {
            HtmlToken::EndOfStream => break,
            token => extractor.feed(token),
        }
    }
    Ok(extractor.finish())
}

struct PageExtractor<'a> {
    base: &'a Url,
    inside_title: bool,
    inside_paragraph: bool,
    result: ExtractionResult,
    seen_links: HashSet<String>,
}

impl<'a> PageExtractor<'a> {
    fn new(base: &'a Url) -> Self {
        PageExtractor {
            base,
            inside_title: false,
            inside_paragraph: false,
            result: ExtractionResult::default(),
            seen_links: HashSet::new(),
        }
    }

    fn feed(&mut self, token: HtmlToken) {
        match token {
            HtmlToken::Text(text) => self.text(&text),
            HtmlToken::StartTag { name, attrs } => match name.as_str() {
                "title" => self.inside_title = true,
                "p" => self.inside_paragraph = true,
                "a" => {
                    for (key, value) in &attrs {
                        if key == "href" {
                            self.link(value);
                        }
                    }
                }
                _ => {}
            },
            HtmlToken::EndTag { name } => match name.as_str() {
                "title" => self.inside_title = false,
                "p" => self.inside_paragraph = false,
                _ => {}
            },
            HtmlToken::EndOfStream => {}
        }
    }

    fn text(&mut self, text: &str) {
        let collapsed = collapse_whitespace(text);
        if collapsed.is_empty() {
            return;
        }

        if self.inside_title {
            if !self.result.title.is_empty() {
                self.result.title.push(' ');
            }
            self.result.title.push_str(&collapsed);
        } else if self.inside_paragraph {
            self.result.body_fragments.push(collapsed.to_lowercase());
        }
    }

    fn link(&mut self, href: &str) {
        match resolve_href(self.base, href) {
            Ok(link) => {
                if self.seen_links.insert(link.clone()) {
                    self.result.links.push(link);
                }
            }
            Err(e) => warn!(page = %self.base, href, error = %e, "skipping malformed link"),
        }
    }

    fn finish(self) -> ExtractionResult {
        self.result
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Hrefs with a host are kept exactly as written; everything else is resolved
// against the page URL
fn resolve_href(base: &Url, href: &str) -> Result<String, UrlError> {
    match Url::parse(href) {
        Ok(url) if url.host_str().is_some() => Ok(href.to_string()),
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(href)
            .map(|url| url.to_string())
            .map_err(|e| UrlError::malformed(href, e)),
        Err(e) => Err(UrlError::malformed(href, e)),
    }
}
