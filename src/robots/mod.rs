// src/robots/mod.rs
// =============================================================================
// robots.txt handling.
//
// Submodules:
// - rules: parses a robots.txt body into Rules
// - policy: decides per URL whether we may fetch it
// =============================================================================

mod policy;
mod rules;

pub use policy::{is_fetchable, VisitedSet};
pub use rules::{PathPattern, Rules};
