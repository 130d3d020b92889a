//! Message matching
//!
//! Decides whether raw message text invokes a command and splits off the
//! remaining text arguments.

use serde::{Deserialize, Serialize};

/// Default token delimiter.
pub const DEFAULT_DELIMITER: &str = " ";

/// How raw text is compared against a command's match text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchingType {
    /// The whole input equals the match text
    Exact,
    /// The first token equals prefix + match text
    #[default]
    PrefixedOneWord,
    /// Same first-token comparison as `PrefixedOneWord`
    StartsWith,
}

impl MatchingType {
    /// Get the string representation of the matching type.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchingType::Exact => "exact",
            MatchingType::PrefixedOneWord => "prefixed_one_word",
            MatchingType::StartsWith => "starts_with",
        }
    }

    /// Parse a matching type from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "exact" => Some(MatchingType::Exact),
            "prefixed_one_word" | "prefixed" => Some(MatchingType::PrefixedOneWord),
            "starts_with" | "startswith" => Some(MatchingType::StartsWith),
            _ => None,
        }
    }
}

/// Message matching rule for one command.
///
/// # Examples
///
/// ```
/// use herald_commands::MatchingSettings;
///
/// let settings = MatchingSettings::prefixed("!", "roll");
/// assert!(settings.matches("!roll 2d6"));
/// assert!(!settings.matches("!rolls"));
/// assert_eq!(settings.arguments("!roll  2d6 adv"), vec!["2d6", "adv"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchingSettings {
    /// Comparison mode
    pub matching_type: MatchingType,

    /// Prefix prepended to the match text (ignored for `Exact`)
    #[serde(default)]
    pub prefix: String,

    /// Token delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Text to match
    pub match_text: String,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl MatchingSettings {
    /// Create settings with an explicit matching type.
    pub fn new(matching_type: MatchingType, prefix: impl Into<String>, match_text: impl Into<String>) -> Self {
        Self {
            matching_type,
            prefix: prefix.into(),
            delimiter: default_delimiter(),
            match_text: match_text.into(),
        }
    }

    /// Match when the whole input equals `match_text`.
    pub fn exact(match_text: impl Into<String>) -> Self {
        Self::new(MatchingType::Exact, "", match_text)
    }

    /// Match when the first token equals `prefix + match_text`.
    pub fn prefixed(prefix: impl Into<String>, match_text: impl Into<String>) -> Self {
        Self::new(MatchingType::PrefixedOneWord, prefix, match_text)
    }

    /// Starts-with matching.
    pub fn starts_with(prefix: impl Into<String>, match_text: impl Into<String>) -> Self {
        Self::new(MatchingType::StartsWith, prefix, match_text)
    }

    /// Set the token delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Check whether `raw` invokes the command.
    pub fn matches(&self, raw: &str) -> bool {
        match self.matching_type {
            MatchingType::Exact => raw == self.match_text,
            MatchingType::PrefixedOneWord | MatchingType::StartsWith => {
                let first = self.tokens(raw).next().unwrap_or_default();
                first.strip_prefix(self.prefix.as_str()) == Some(self.match_text.as_str())
            }
        }
    }

    /// Text arguments following the command token.
    ///
    /// Empty tokens produced by repeated delimiters are dropped. Exact
    /// matches have no arguments.
    pub fn arguments(&self, raw: &str) -> Vec<String> {
        match self.matching_type {
            MatchingType::Exact => Vec::new(),
            MatchingType::PrefixedOneWord | MatchingType::StartsWith => self
                .tokens(raw)
                .skip(1)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    fn tokens<'a>(&'a self, raw: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        if self.delimiter.is_empty() {
            Box::new(std::iter::once(raw))
        } else {
            Box::new(raw.split(self.delimiter.as_str()))
        }
    }
}
