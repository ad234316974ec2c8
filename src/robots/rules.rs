// src/robots/rules.rs
// =============================================================================
// Parses a robots.txt body into allow/disallow patterns and a crawl delay.
//
// Only the wildcard section ("User-agent: *") applies to us. Named sections
// switch matching off until the next "*" line. A new "*" section replaces
// whatever an earlier "*" section recorded.
//
// Patterns are stored as full host+path keys (the seed's normalized prefix
// followed by the directive's path), so they can be compared directly with
// normalized page URLs.
// =============================================================================

use std::time::Duration;

use regex::Regex;
use tracing::{trace, warn};

// One Allow/Disallow entry
//
// A pattern matches a normalized URL if either:
// - it is a shell-style glob match ('*' and '?' never cross a '/'), or
// - the pattern text is a literal prefix of the URL
#[derive(Debug, Clone)]
pub struct PathPattern {
    text: String,
    glob: Option<Regex>,
}

impl PathPattern {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let glob = glob_to_regex(&text);
        PathPattern { text, glob }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn matches(&self, key: &str) -> bool {
        let globbed = self.glob.as_ref().is_some_and(|re| re.is_match(key));
        globbed || key.starts_with(&self.text)
    }
}

// Converts a glob into an anchored regex
fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*", "[^/]*")
        .replace(r"\?", "[^/]");
    match Regex::new(&format!("^{escaped}$")) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern, error = %e, "can't compile robots pattern, falling back to prefix match");
            None
        }
    }
}

/// Crawl policy for one seed, built from that seed's robots.txt.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    pub allowed: Vec<PathPattern>,
    pub disallowed: Vec<PathPattern>,
    pub crawl_delay_secs: u64,
}

impl Rules {
    // Parses a robots.txt body
    //
    // Parameters:
    //   prefix: the seed's normalized host+path, prepended to every path rule
    //   body: the raw robots.txt text (empty when the site has none)
    //
    // Lines without a ':' are skipped. Only the first ':' splits key from
    // value, so values like "http://..." stay intact.
    pub fn parse(prefix: &str, body: &str) -> Rules {
        let mut rules = Rules::default();
        let mut applicable = false;
        // true while we are inside a run of User-agent lines that already named "*"
        let mut wildcard_in_group = false;

        for line in body.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                trace!(line = trimmed, "skipping robots line without a key");
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key == "User-agent" {
                if value == "*" {
                    if !wildcard_in_group {
                        rules = Rules::default();
                    }
                    wildcard_in_group = true;
                    applicable = true;
                } else {
                    applicable = false;
                }
                continue;
            }
            wildcard_in_group = false;

            if !applicable {
                continue;
            }

            match key {
                "Allow" if value.starts_with('/') => {
                    rules.allowed.push(PathPattern::new(format!("{prefix}{value}")));
                }
                "Disallow" if value.starts_with('/') => {
                    rules.disallowed.push(PathPattern::new(format!("{prefix}{value}")));
                }
                "Crawl-delay" => match value.parse::<u64>() {
                    Ok(delay) => rules.crawl_delay_secs = delay,
                    Err(e) => {
                        warn!(value, error = %e, "can't parse crawl delay, using 0");
                        rules.crawl_delay_secs = 0;
                    }
                },
                _ => {}
            }
        }

        rules
    }

    pub fn crawl_delay(&self) -> Duration {
        Duration::from_secs(self.crawl_delay_secs)
    }
}
