// src/extract/tokens.rs
// =============================================================================
// Turns raw page bytes into a flat stream of HTML tokens.
//
// We use html5ever's tokenizer directly (the same engine scraper parses
// with) instead of building a DOM: the extractor only needs to see tags and
// text in document order.
//
// The stream:
// - StartTag / EndTag with lowercased names
// - Text, one token per text node (adjacent character runs are merged)
// - EndOfStream, always last on success
// - Err(TokenizeError) if the tokenizer stops before the end of the page
//
// Bytes that are not valid UTF-8 become U+FFFD, the way browsers decode
// them, so a Latin-1 page still tokenises. The page is fed to html5ever a
// chunk at a time and tokens come out as the consumer pulls them.
// =============================================================================

use std::collections::VecDeque;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
    TokenizerResult,
};
use tracing::{trace, warn};

use crate::error::TokenizeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
    },
    EndTag {
        name: String,
    },
    Text(String),
    EndOfStream,
}

// How much decoded text goes into the tokenizer per feed
const CHUNK_BYTES: usize = 16 * 1024;

// Collects tokens as html5ever pushes them at us
#[derive(Default)]
struct Collector {
    tokens: Vec<HtmlToken>,
    text: String,
}

impl Collector {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.tokens.push(HtmlToken::Text(std::mem::take(&mut self.text)));
        }
    }

    fn push_tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        match tag.kind {
            TagKind::StartTag => {
                let attrs = tag
                    .attrs
                    .into_iter()
                    .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                    .collect();

                // Without a tree builder nobody else tells the tokenizer that
                // <script> or <title> contents are not markup
                let raw = match name.as_str() {
                    "script" => Some(RawKind::ScriptData),
                    "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
                    "title" | "textarea" => Some(RawKind::Rcdata),
                    _ => None,
                };
                let self_closing = tag.self_closing;

                self.tokens.push(HtmlToken::StartTag { name, attrs });

                match raw {
                    Some(kind) if !self_closing => TokenSinkResult::RawData(kind),
                    _ => TokenSinkResult::Continue,
                }
            }
            TagKind::EndTag => {
                self.tokens.push(HtmlToken::EndTag { name });
                TokenSinkResult::Continue
            }
        }
    }
}

impl TokenSink for Collector {
    type Handle = ();

    fn process_token(&mut self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => self.text.push_str(&text),
            Token::TagToken(tag) => {
                self.flush_text();
                return self.push_tag(tag);
            }
            Token::EOFToken => {
                self.flush_text();
                self.tokens.push(HtmlToken::EndOfStream);
            }
            // html5ever recovers from these on its own
            Token::ParseError(reason) => trace!(line_number, %reason, "recoverable markup error"),
            Token::CommentToken(_) | Token::DoctypeToken(_) => self.flush_text(),
            Token::NullCharacterToken => {}
        }
        TokenSinkResult::Continue
    }
}

/// Lazily tokenised page. Finishes after `EndOfStream` or the first error.
pub struct TokenStream {
    tokenizer: Tokenizer<Collector>,
    input: BufferQueue,
    text: String,
    offset: usize,
    pending: VecDeque<Result<HtmlToken, TokenizeError>>,
    finished: bool,
}

impl TokenStream {
    fn new(text: String) -> Self {
        TokenStream {
            tokenizer: Tokenizer::new(Collector::default(), TokenizerOpts::default()),
            input: BufferQueue::new(),
            text,
            offset: 0,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    // Next chunk boundary at or after CHUNK_BYTES that doesn't split a char
    fn chunk_end(&self) -> usize {
        let mut end = (self.offset + CHUNK_BYTES).min(self.text.len());
        while !self.text.is_char_boundary(end) {
            end += 1;
        }
        end
    }

    fn advance(&mut self) {
        if self.offset == self.text.len() {
            self.tokenizer.end();
            self.pending.extend(self.tokenizer.sink.tokens.drain(..).map(Ok));
            self.finished = true;
            return;
        }

        let end = self.chunk_end();
        self.input.push_back(StrTendril::from_slice(&self.text[self.offset..end]));
        self.offset = end;

        match self.tokenizer.feed(&mut self.input) {
            TokenizerResult::Done => {
                self.pending.extend(self.tokenizer.sink.tokens.drain(..).map(Ok));
            }
            TokenizerResult::Script(_) => {
                warn!(offset = self.offset, "tokenizer suspended before end of page");
                self.pending.extend(self.tokenizer.sink.tokens.drain(..).map(Ok));
                self.pending.push_back(Err(TokenizeError::Suspended {
                    offset: self.offset,
                }));
                self.finished = true;
            }
        }
    }
}

impl Iterator for TokenStream {
    type Item = Result<HtmlToken, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            self.advance();
        }
    }
}

pub fn tokenize(page: &[u8]) -> TokenStream {
    TokenStream::new(String::from_utf8_lossy(page).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(html: &str) -> Vec<HtmlToken> {
        tokenize(html.as_bytes()).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn test_basic_stream() {
        let tokens = collect(r#"<p class="x">Hi</p>"#);
        assert_eq!(
            tokens,
            vec![
                HtmlToken::StartTag {
                    name: "p".to_string(),
                    attrs: vec![("class".to_string(), "x".to_string())],
                },
                HtmlToken::Text("Hi".to_string()),
                HtmlToken::EndTag { name: "p".to_string() },
                HtmlToken::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_entities_stay_in_one_text_node() {
        let tokens = collect("<p>Fish &amp; chips</p>");
        assert!(tokens.contains(&HtmlToken::Text("Fish & chips".to_string())));
    }

    #[test]
    fn test_tag_names_lowercased() {
        let tokens = collect("<P>x</P>");
        assert!(matches!(&tokens[0], HtmlToken::StartTag { name, .. } if name == "p"));
    }

    #[test]
    fn test_script_contents_are_text() {
        let tokens = collect("<script>if (a < b) { x = '<p>'; }</script>");
        assert_eq!(tokens[1], HtmlToken::Text("if (a < b) { x = '<p>'; }".to_string()));
        assert_eq!(tokens[2], HtmlToken::EndTag { name: "script".to_string() });
    }

    #[test]
    fn test_latin1_bytes_become_replacement_chars() {
        let mut page = b"<title>Caf\xE9</title><p>".to_vec();
        page.extend(std::iter::repeat(b'a').take(600));
        page.extend_from_slice(b"</p>");

        let tokens: Vec<_> = tokenize(&page).map(|t| t.unwrap()).collect();
        assert_eq!(tokens[1], HtmlToken::Text("Caf\u{FFFD}".to_string()));
        assert_eq!(tokens[4], HtmlToken::Text("a".repeat(600)));
        assert_eq!(tokens.last(), Some(&HtmlToken::EndOfStream));
    }

    #[test]
    fn test_tag_split_across_chunks() {
        // "<" ends the first chunk, "p>" starts the second
        let mut html = "x".repeat(CHUNK_BYTES - 1);
        html.push_str("<p>hello</p>");

        let tokens = collect(&html);
        assert_eq!(
            tokens,
            vec![
                HtmlToken::Text("x".repeat(CHUNK_BYTES - 1)),
                HtmlToken::StartTag { name: "p".to_string(), attrs: vec![] },
                HtmlToken::Text("hello".to_string()),
                HtmlToken::EndTag { name: "p".to_string() },
                HtmlToken::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_chunks_never_split_a_char() {
        let mut html = "x".repeat(CHUNK_BYTES - 1);
        html.push('é');
        html.push_str("<p>hi</p>");

        let stream = tokenize(html.as_bytes());
        assert_eq!(stream.chunk_end(), CHUNK_BYTES + 1);

        let tokens = collect(&html);
        assert_eq!(tokens[0], HtmlToken::Text(format!("{}é", "x".repeat(CHUNK_BYTES - 1))));
    }

    #[test]
    fn test_stream_stops_after_end() {
        let mut stream = tokenize(b"<br>");
        assert!(stream.by_ref().any(|t| matches!(t, Ok(HtmlToken::EndOfStream))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_empty_page_ends_cleanly() {
        assert_eq!(collect(""), vec![HtmlToken::EndOfStream]);
    }
}
