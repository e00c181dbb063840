//! Lexical fuzzy matching over identifiers and titles.

use std::cmp::Ordering;

use strsim::jaro_winkler;

/// A lexical match: record identifier and its Jaro-Winkler similarity
/// to the query, in [0, 1] (descending is better).
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub identifier: String,
    pub similarity: f64,
}

/// Jaro-Winkler matcher over `(identifier, title)` entries.
///
/// An entry's similarity to a query is the larger of the query's
/// similarity to the identifier and to the title, so a typo'd title and
/// a mistyped DOI both find their record. Matching is deterministic:
/// ties are broken by identifier lexical order.
#[derive(Debug, Default)]
pub struct FuzzyMatcher {
    entries: Vec<(String, String)>,
}

impl FuzzyMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matcher from `(identifier, title)` pairs.
    #[must_use]
    pub fn from_entries(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Register an entry.
    pub fn insert(&mut self, identifier: impl Into<String>, title: impl Into<String>) {
        self.entries.push((identifier.into(), title.into()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find entries whose similarity to `query` is at least `threshold`.
    ///
    /// Results are sorted descending by similarity, ties broken by
    /// identifier lexical order. Comparison is case-insensitive.
    #[must_use]
    pub fn search(&self, query: &str, threshold: f64) -> Vec<FuzzyMatch> {
        let query = query.to_lowercase();

        let mut matches: Vec<FuzzyMatch> = self
            .entries
            .iter()
            .filter_map(|(identifier, title)| {
                let by_identifier = jaro_winkler(&query, &identifier.to_lowercase());
                let by_title = jaro_winkler(&query, &title.to_lowercase());
                let similarity = by_identifier.max(by_title);
                (similarity >= threshold).then(|| FuzzyMatch {
                    identifier: identifier.clone(),
                    similarity,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matcher() -> FuzzyMatcher {
        FuzzyMatcher::from_entries(vec![
            (
                "10.1000/xyz".to_string(),
                "Attention Is All You Need".to_string(),
            ),
            (
                "978-0-306-40615-7".to_string(),
                "The Art of Computer Programming".to_string(),
            ),
            (
                "10.5555/abc".to_string(),
                "Deep Residual Learning".to_string(),
            ),
        ])
    }

    #[test]
    fn test_typo_matches_above_threshold() {
        let matcher = sample_matcher();
        let matches = matcher.search("Attention is all u need", 0.85);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].identifier, "10.1000/xyz");
        assert!(matches[0].similarity >= 0.85);
    }

    #[test]
    fn test_exact_title_is_perfect_match() {
        let matcher = sample_matcher();
        let matches = matcher.search("Attention Is All You Need", 0.99);
        assert_eq!(matches.len(), 1);
        assert!((matches[0].similarity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_identifier_lookup() {
        let matcher = sample_matcher();
        // Slightly mangled DOI still matches by identifier
        let matches = matcher.search("10.1000/xzy", 0.85);
        assert_eq!(matches[0].identifier, "10.1000/xyz");
    }

    #[test]
    fn test_threshold_filters() {
        let matcher = sample_matcher();
        let matches = matcher.search("completely unrelated gibberish", 0.95);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_results_sorted_descending() {
        let matcher = sample_matcher();
        let matches = matcher.search("learning", 0.0);
        for pair in matches.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn test_jaro_winkler_symmetry() {
        for (a, b) in [
            ("Attention Is All You Need", "Attention is all u need"),
            ("10.1000/xyz", "10.1000/xzy"),
            ("", "nonempty"),
        ] {
            assert!((jaro_winkler(a, b) - jaro_winkler(b, a)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_deterministic_tie_break() {
        let matcher = FuzzyMatcher::from_entries(vec![
            ("10.2/b".to_string(), "Same Title".to_string()),
            ("10.1/a".to_string(), "Same Title".to_string()),
        ]);
        let matches = matcher.search("Same Title", 0.9);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].identifier, "10.1/a");
        assert_eq!(matches[1].identifier, "10.2/b");
    }

    #[test]
    fn test_search_idempotent() {
        let matcher = sample_matcher();
        let first = matcher.search("attention", 0.5);
        let second = matcher.search("attention", 0.5);
        assert_eq!(first, second);
    }
}
