//! URL patterns for matching network traffic
//!
//! Two forms, matching how endpoints are targeted in practice:
//!
//! - a pattern containing `*` or `?` is a glob matched against the full
//!   URL: `*` matches within a path segment, `**` across segments, `?` a
//!   single character. A trailing `*` is how callers tolerate query
//!   strings (`**/arc/v1/notices*`).
//! - anything else is a plain substring test (`arc/v1/notices`), enough to
//!   target one endpoint irrespective of host and query.

use std::fmt;

use regex::Regex;

use crate::common::{Error, Result};

/// A compiled URL pattern
#[derive(Debug, Clone)]
pub struct UrlPattern {
    raw: String,
    kind: Kind,
}

#[derive(Debug, Clone)]
enum Kind {
    Substring,
    Glob(Regex),
}

impl UrlPattern {
    /// Compile a glob or substring pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let kind = if pattern.contains('*') || pattern.contains('?') {
            let regex = Regex::new(&glob_to_regex(pattern)).map_err(|e| {
                Error::Config(format!("invalid url pattern '{pattern}': {e}"))
            })?;
            Kind::Glob(regex)
        } else {
            Kind::Substring
        };

        Ok(Self {
            raw: pattern.to_string(),
            kind,
        })
    }

    /// Test a URL against this pattern
    pub fn matches(&self, url: &str) -> bool {
        match &self.kind {
            Kind::Substring => url.contains(&self.raw),
            Kind::Glob(regex) => regex.is_match(url),
        }
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut re = String::with_capacity(glob.len() * 2);
    re.push('^');
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    re.push_str(".*");
                } else {
                    re.push_str("[^/]*");
                }
            }
            '?' => re.push_str("[^/]"),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    re
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_pattern() {
        let pattern = UrlPattern::new("arc/v1/notices").unwrap();
        assert!(pattern.matches("https://dev.cittadini.pagopa.it/arc/v1/notices"));
        assert!(pattern.matches("https://host/arc/v1/notices?size=10"));
        assert!(!pattern.matches("https://host/arc/v1/transactions/1"));
    }

    #[test]
    fn test_glob_tolerates_query_string() {
        let pattern = UrlPattern::new("**/arc/v1/notices*").unwrap();
        assert!(pattern.matches("https://host/arc/v1/notices"));
        assert!(pattern.matches("https://host/arc/v1/notices?page=2"));
        assert!(!pattern.matches("https://host/arc/v1/notices/extra/path"));
    }

    #[test]
    fn test_single_star_stops_at_segment_boundary() {
        let pattern = UrlPattern::new("**/arc/v1/transactions/*").unwrap();
        assert!(pattern.matches("https://host/arc/v1/transactions/evt-1"));
        assert!(pattern.matches("https://host/arc/v1/transactions/evt-1?lang=it"));
        // the receipt endpoint is one segment deeper and must not match
        assert!(!pattern.matches("https://host/arc/v1/transactions/evt-1/receipt"));
    }

    #[test]
    fn test_receipt_endpoint_pattern() {
        let pattern = UrlPattern::new("*/**/arc/v1/transactions/**/receipt*").unwrap();
        assert!(pattern.matches("https://host/arc/v1/transactions/evt-1/receipt"));
        assert!(pattern.matches("https://host/arc/v1/transactions/evt-1/receipt?inline=true"));
        assert!(!pattern.matches("https://host/arc/v1/transactions/evt-1"));
    }

    #[test]
    fn test_glob_escapes_regex_metacharacters() {
        let pattern = UrlPattern::new("**/v1/pull?opt-in=*").unwrap();
        // '?' is a single-character wildcard, '.' and '=' are literal
        assert!(pattern.matches("https://host/v1/pullXopt-in=true"));
        assert!(!pattern.matches("https://host/v1/pull/opt-in=true"));
    }

    #[test]
    fn test_full_match_required_for_globs() {
        let pattern = UrlPattern::new("https://host/api/*").unwrap();
        assert!(pattern.matches("https://host/api/one"));
        assert!(!pattern.matches("prefix https://host/api/one"));
    }
}
