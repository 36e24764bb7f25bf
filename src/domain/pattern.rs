//! Wildcard matching for workspace names.
//!
//! Distinct from filesystem globs: `*` is the only special character and
//! matches any run of characters, including none.

use regex::Regex;

/// The wildcard character
pub const WILDCARD: char = '*';

/// A compiled, fully anchored wildcard pattern
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compile a wildcard pattern. Every non-`*` character matches literally.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let body = pattern
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("(?s)^{}$", body))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Check a candidate against the whole pattern
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Check whether `candidate` matches the wildcard `pattern` in full
pub fn matches(pattern: &str, candidate: &str) -> bool {
    WildcardPattern::new(pattern)
        .map(|compiled| compiled.is_match(candidate))
        .unwrap_or(false)
}

/// Whether a string contains the wildcard character
pub fn has_wildcard(s: &str) -> bool {
    s.contains(WILDCARD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern_is_anchored() {
        assert!(matches("library-a", "library-a"));
        assert!(!matches("library", "library-a"));
        assert!(!matches("brary-a", "library-a"));
        assert!(!matches("Library-a", "library-a"));
    }

    #[test]
    fn test_wildcards() {
        assert!(matches("*", "anything"));
        assert!(matches("*", ""));
        assert!(matches("*-a", "application-a"));
        assert!(matches("library-*", "library-"));
        assert!(matches("*a*-a*", "library-a"));
        assert!(matches("**b****-*b**", "library-b"));
        assert!(!matches("**b****-*b**", "application-b"));
        assert!(!matches("*-c", "library-b"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches("a.b", "a.b"));
        assert!(!matches("a.b", "axb"));
        assert!(matches("@scope/pkg+(1)", "@scope/pkg+(1)"));
        assert!(matches("[x]*", "[x]-y"));
        assert!(!matches("^a$", "a"));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty() {
        assert!(matches("", ""));
        assert!(!matches("", "a"));
    }

    #[test]
    fn test_compiled_pattern() {
        let pattern = WildcardPattern::new("app*").unwrap();
        assert_eq!(pattern.as_str(), "app*");
        assert!(pattern.is_match("application-b"));
        assert!(has_wildcard("app*"));
        assert!(!has_wildcard("app"));
    }
}
