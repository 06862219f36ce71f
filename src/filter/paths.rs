//! Ant-style path patterns for unsecured routes.
//!
//! - `?` matches one character other than `/`
//! - `*` matches zero or more characters within a segment
//! - `**` matches zero or more whole segments
//! - a trailing `/**` also matches the bare prefix (`/public/**` matches `/public`)
//!
//! Patterns without wildcards match the path exactly.

use regex::Regex;

use crate::error::ConfigError;

/// Compiled set of path patterns.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    patterns: Vec<(String, Regex)>,
}

impl PathMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref().trim().to_string();
                compile(&pattern).map(|regex| (pattern, regex))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PathMatcher { patterns })
    }

    /// First pattern matching `path`, if any.
    pub fn find(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(path))
            .map(|(pattern, _)| pattern.as_str())
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(p, _)| p.as_str())
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    let mut regex = String::with_capacity(pattern.len() * 2 + 2);
    regex.push('^');

    let (body, any_suffix) = match pattern.strip_suffix("/**") {
        Some(prefix) => (prefix, true),
        None => (pattern, false),
    };

    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                if chars.get(i + 1) == Some(&'/') {
                    // `**/` spans zero or more whole segments
                    regex.push_str("(?:[^/]*/)*");
                    i += 1;
                } else {
                    regex.push_str(".*");
                }
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    if any_suffix {
        regex.push_str("(?:/.*)?");
    }
    regex.push('$');

    Regex::new(&regex)
        .map_err(|e| ConfigError::Invalid(format!("unsecured path pattern '{}': {}", pattern, e)))
}
