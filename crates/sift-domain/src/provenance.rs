//! Provenance markers
//!
//! Every fact a provider returns is expected to carry a citation of the form
//! `[source: path[:line]]`, and every insight a `[source: path]`. The
//! pipeline only checks that a marker is *present*; it never verifies that
//! the cited location actually supports the statement.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    // [source: path] or [source: path:line], case-insensitive keyword
    static ref CITATION_REGEX: Regex = Regex::new(
        r"(?i)\[\s*source\s*:\s*([^\]]+?)\s*\]"
    ).unwrap();

    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// A parsed `[source: path[:line]]` marker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    /// Cited file path
    pub path: String,

    /// Optional 1-based line number
    pub line: Option<u32>,
}

impl Citation {
    /// Create a citation without a line number
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: None,
        }
    }

    /// Attach a line number
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    fn parse_inner(inner: &str) -> Self {
        if let Some((path, line)) = inner.rsplit_once(':') {
            if let Ok(line) = line.trim().parse::<u32>() {
                return Self {
                    path: path.trim().to_string(),
                    line: Some(line),
                };
            }
        }
        Self::new(inner.trim())
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[source: {}:{}]", self.path, line),
            None => write!(f, "[source: {}]", self.path),
        }
    }
}

/// Find every citation marker in a string, in order of appearance
///
/// # Examples
///
/// ```
/// use sift_domain::provenance::find_citations;
///
/// let cites = find_citations("Acme ships X [source: notes/a.md:4]");
/// assert_eq!(cites.len(), 1);
/// assert_eq!(cites[0].path, "notes/a.md");
/// assert_eq!(cites[0].line, Some(4));
/// ```
pub fn find_citations(text: &str) -> Vec<Citation> {
    CITATION_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| Citation::parse_inner(m.as_str()))
        .filter(|c| !c.path.is_empty())
        .collect()
}

/// True when the string carries at least one citation marker
pub fn has_citation(text: &str) -> bool {
    !find_citations(text).is_empty()
}

/// Remove all citation markers and collapse the remaining whitespace
pub fn strip_citations(text: &str) -> String {
    let stripped = CITATION_REGEX.replace_all(text, " ");
    WHITESPACE_REGEX
        .replace_all(stripped.trim(), " ")
        .trim()
        .to_string()
}
