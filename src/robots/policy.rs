// src/robots/policy.rs
// =============================================================================
// Decides whether a normalized URL may be fetched.
//
// Decision:
// 1. Already visited -> no. Otherwise record it as visited, whatever happens
//    to the fetch afterwards.
// 2. First matching Disallow pattern (input order) -> disallowed.
// 3. First matching Allow pattern (input order) -> allowed.
// 4. Both matched -> the longer pattern text wins; equal lengths allow.
// 5. Nothing matched -> allowed.
// =============================================================================

use std::collections::HashSet;

use tracing::debug;

use super::rules::{PathPattern, Rules};

/// Normalized URLs one traversal has already considered.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    // Returns true only the first time a key is inserted
    fn insert(&mut self, key: &str) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.to_string())
    }
}

fn first_match<'a>(patterns: &'a [PathPattern], key: &str) -> Option<&'a PathPattern> {
    patterns.iter().find(|pattern| pattern.matches(key))
}

pub fn is_fetchable(visited: &mut VisitedSet, rules: &Rules, key: &str) -> bool {
    if !visited.insert(key) {
        return false;
    }

    let disallowed_on = first_match(&rules.disallowed, key);
    let allowed_on = first_match(&rules.allowed, key);

    let allowed = match (disallowed_on, allowed_on) {
        (Some(disallow), Some(allow)) => disallow.len() <= allow.len(),
        (Some(_), None) => false,
        (None, _) => true,
    };

    if !allowed {
        debug!(
            url = key,
            pattern = disallowed_on.map(PathPattern::as_str).unwrap_or_default(),
            "disallowed by robots.txt"
        );
    }
    allowed
}
