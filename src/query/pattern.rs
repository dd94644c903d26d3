//! Wildcard patterns for IS comparisons
//!
//! Grammar: `^\*?[^*]*\*?$`. A `*` may appear only as the first and/or
//! last character and matches any sequence of characters, including
//! the empty one. Everything else matches literally.

use std::fmt;

use regex::Regex;

use super::errors::{QueryError, QueryResult};

/// Checks a pattern against the wildcard grammar
pub fn is_valid_wildcard(pattern: &str) -> bool {
    let inner = pattern.strip_prefix('*').unwrap_or(pattern);
    let inner = inner.strip_suffix('*').unwrap_or(inner);
    !inner.contains('*')
}

/// A wildcard pattern compiled once to an anchored matcher
#[derive(Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compiles a pattern. Callers validate the grammar first.
    pub fn new(pattern: &str) -> QueryResult<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = Regex::new(&format!("(?s)^{}$", body))
            .map_err(|e| QueryError::invalid(format!("Bad IS pattern '{}': {}", pattern, e)))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Tests the whole value against the pattern
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Returns the pattern as written in the query
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for WildcardPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WildcardPattern").field(&self.source).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(p: &str) -> WildcardPattern {
        WildcardPattern::new(p).unwrap()
    }

    #[test]
    fn test_grammar() {
        assert!(is_valid_wildcard("abc"));
        assert!(is_valid_wildcard("*abc"));
        assert!(is_valid_wildcard("abc*"));
        assert!(is_valid_wildcard("*abc*"));
        assert!(is_valid_wildcard("*"));
        assert!(is_valid_wildcard("**"));
        assert!(is_valid_wildcard(""));
        assert!(!is_valid_wildcard("a*c"));
        assert!(!is_valid_wildcard("***"));
        assert!(!is_valid_wildcard("*a*c"));
    }

    #[test]
    fn test_trailing_wildcard() {
        let p = pattern("abc*");
        assert!(p.is_match("abcdef"));
        assert!(p.is_match("abc"));
        assert!(!p.is_match("xabc"));
    }

    #[test]
    fn test_both_wildcards() {
        let p = pattern("*abc*");
        assert!(p.is_match("xabcy"));
        assert!(p.is_match("abc"));
        assert!(!p.is_match("ab"));
    }

    #[test]
    fn test_interior_star_compiles_as_any_sequence() {
        // Rejected by the validator, but the matcher itself is well defined
        let p = pattern("a*b");
        assert!(p.is_match("ab"));
        assert!(p.is_match("axxxb"));
        assert!(!p.is_match("ba"));
    }

    #[test]
    fn test_exact_match_is_anchored() {
        let p = pattern("cpsc");
        assert!(p.is_match("cpsc"));
        assert!(!p.is_match("cpsc1"));
        assert!(!p.is_match("xcpsc"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let p = pattern("a.b(c)*");
        assert!(p.is_match("a.b(c)"));
        assert!(p.is_match("a.b(c)d"));
        assert!(!p.is_match("axb(c)"));
    }

    #[test]
    fn test_empty_pattern_matches_empty_only() {
        let p = pattern("");
        assert!(p.is_match(""));
        assert!(!p.is_match("a"));
    }
}
