//! Issue reference extraction
//!
//! A stateless pattern matcher over commit message text. Rules are ordered;
//! matches are returned in message order per rule. Unmatched text is not an
//! error and yields an empty sequence.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// An issue-tracker identifier parsed out of a commit message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReference {
    /// The matched identifier (e.g. `PROJ-42`)
    pub id: String,
    /// Label of the rule that produced the match (e.g. `ticket-key`)
    pub kind: String,
}

/// A single extraction rule
#[derive(Debug, Clone)]
pub struct IssuePattern {
    pub label: String,
    pub regex: Regex,
}

impl IssuePattern {
    /// Compile a rule; invalid patterns are a configuration error
    pub fn new(label: impl Into<String>, pattern: &str) -> crate::Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| crate::Error::Config(format!("Bad issue pattern: {}", e)))?;
        Ok(Self { label: label.into(), regex })
    }
}

/// Extracts issue references from commit messages using configurable rules
#[derive(Debug, Clone)]
pub struct IssueExtractor {
    patterns: Vec<IssuePattern>,
}

impl IssueExtractor {
    /// Create an extractor with an explicit rule set
    pub fn new(patterns: Vec<IssuePattern>) -> Self {
        Self { patterns }
    }

    /// Extract all issue references from a message, in match order.
    ///
    /// Never fails regardless of input content.
    pub fn extract(&self, message: &str) -> Vec<IssueReference> {
        let mut refs = Vec::new();
        for pattern in &self.patterns {
            for m in pattern.regex.find_iter(message) {
                refs.push(IssueReference {
                    id: m.as_str().to_string(),
                    kind: pattern.label.clone(),
                });
            }
        }
        refs
    }
}

impl Default for IssueExtractor {
    /// Default rules: JIRA-style ticket keys and `#123` issue numbers
    fn default() -> Self {
        let patterns = vec![
            IssuePattern::new("ticket-key", r"\b[A-Z][A-Z0-9]+-\d+\b")
                .expect("built-in pattern is valid"),
            IssuePattern::new("issue-number", r"#\d+").expect("built-in pattern is valid"),
        ];
        Self::new(patterns)
    }
}
