// src/crawl/urls.rs
// =============================================================================
// URL helpers shared by the traversal loop and the robots policy.
//
// - normalize(): turns a URL into its identity key, host + path without the
//   trailing slash. Scheme, query and fragment are dropped, so
//   https://a.com/x/ and http://a.com/x?page=2 are "the same page".
// - is_same_domain(): exact hostname comparison against the seed.
//   No subdomain folding: docs.a.com is NOT a.com.
// =============================================================================

use url::Url;

use crate::error::UrlError;

// Parses a URL string, wrapping the parser error with the offending input
pub fn parse(raw: &str) -> Result<Url, UrlError> {
    Url::parse(raw).map_err(|e| UrlError::malformed(raw, e))
}

// Returns the host+path identity key for a URL
//
// Example:
//   "https://a.com/x/"  -> "a.com/x"
//   "https://a.com"     -> "a.com"
//   "http://a.com:8080/docs/?q=1" -> "a.com:8080/docs"
pub fn normalize(raw: &str) -> Result<String, UrlError> {
    let url = parse(raw)?;
    Ok(normalize_url(&url))
}

pub fn normalize_url(url: &Url) -> String {
    let mut key = String::new();
    if let Some(host) = url.host_str() {
        key.push_str(host);
    }
    // url drops default ports, so this only keeps explicit ones like :8080
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(url.path().trim_end_matches('/'));
    key
}

// Checks whether `candidate` lives on exactly the same host as the seed
pub fn is_same_domain(seed: &Url, candidate: &str) -> Result<bool, UrlError> {
    Ok(same_host(seed, &parse(candidate)?))
}

// Same check for a URL the caller has already parsed
pub fn same_host(seed: &Url, candidate: &Url) -> bool {
    candidate.host_str().is_some() && candidate.host_str() == seed.host_str()
}
