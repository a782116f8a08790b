//! Set difference between scraped candidates and recorded slugs.

use std::collections::HashSet;

/// Return the candidates that are not in the known set, preserving the
/// candidates' order. The listing is newest-first, so the result is too.
pub fn unknown_slugs(candidates: &[String], known: &HashSet<String>) -> Vec<String> {
    candidates
        .iter()
        .filter(|slug| !known.contains(*slug))
        .cloned()
        .collect()
}
