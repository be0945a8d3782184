// src/fetch/dedup.rs
// =============================================================================
// Endpoint deduplication.
//
// Each endpoint is fetched once per run no matter how many times the caller
// lists it. The first occurrence wins its place in the order; the engine
// doesn't depend on that order, but it keeps scheduling repeatable.
// =============================================================================

use std::collections::HashSet;

/// Removes duplicate endpoints, keeping the first occurrence of each.
pub fn dedup_endpoints<I, S>(endpoints: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    endpoints
        .into_iter()
        .map(Into::into)
        .filter(|endpoint| seen.insert(endpoint.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_removed() {
        let unique = dedup_endpoints(["A", "A", "B", "A", "C", "B"]);
        assert_eq!(unique, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_input() {
        let unique = dedup_endpoints(Vec::<String>::new());
        assert!(unique.is_empty());
    }

    #[test]
    fn test_endpoints_are_opaque() {
        // No normalisation: a trailing slash makes a different endpoint
        let unique = dedup_endpoints(["https://a.test", "https://a.test/"]);
        assert_eq!(unique.len(), 2);
    }
}
