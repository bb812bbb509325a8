// src/search/locale.rs
//! Locale heuristic for search results.
//!
//! Three outcomes: a location text containing an accepted token is a match, a
//! location text without one is a non-match, and no location text at all is
//! unknown. Unknown items are kept because the provider already filters by
//! author location upstream.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleDecision {
    Match,
    NonMatch,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFilter {
    /// Display label, e.g. "Mexico".
    pub label: String,
    /// Accepted substrings, matched case-insensitively.
    pub tokens: Vec<String>,
}

impl Default for LocaleFilter {
    fn default() -> Self {
        Self::new(
            "Mexico",
            ["mexico", "méxico", "mex", "cdmx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl LocaleFilter {
    /// Tokens are trimmed, lowercased and deduplicated; blanks are dropped.
    pub fn new(label: impl Into<String>, tokens: Vec<String>) -> Self {
        let mut clean: Vec<String> = tokens
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        clean.sort();
        clean.dedup();
        Self {
            label: label.into(),
            tokens: clean,
        }
    }

    pub fn decide(&self, location: Option<&str>) -> LocaleDecision {
        let Some(loc) = location.map(str::trim).filter(|l| !l.is_empty()) else {
            return LocaleDecision::Unknown;
        };
        let loc = loc.to_lowercase();
        if self.tokens.iter().any(|t| loc.contains(t.as_str())) {
            LocaleDecision::Match
        } else {
            LocaleDecision::NonMatch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_way_decision() {
        let f = LocaleFilter::default();
        assert_eq!(f.decide(Some("Monterrey, Mexico")), LocaleDecision::Match);
        assert_eq!(f.decide(Some("Madrid, Spain")), LocaleDecision::NonMatch);
        assert_eq!(f.decide(None), LocaleDecision::Unknown);
        assert_eq!(f.decide(Some("   ")), LocaleDecision::Unknown);
    }

    #[test]
    fn matching_is_case_insensitive_and_unicode_aware() {
        let f = LocaleFilter::default();
        assert_eq!(f.decide(Some("CIUDAD DE MÉXICO")), LocaleDecision::Match);
        assert_eq!(f.decide(Some("Guadalajara, Jal. MX")), LocaleDecision::NonMatch);
        assert_eq!(f.decide(Some("cdmx")), LocaleDecision::Match);
    }

    #[test]
    fn tokens_are_cleaned() {
        let f = LocaleFilter::new("X", vec![" Foo ".into(), "".into(), "foo".into()]);
        assert_eq!(f.tokens, vec!["foo".to_string()]);
    }
}
