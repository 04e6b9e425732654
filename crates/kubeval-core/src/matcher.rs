//! Resource name matching
//!
//! `matches` and `matches_str` are total: they never fail and never panic.
//! Check definitions carry a pre-compiled [`NameMatcher`] so a regex
//! pattern is compiled once, when the definition is constructed.

use crate::error::DefinitionError;
use crate::types::MatchType;
use regex::Regex;

/// Compiled form of a match rule
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Exact(String),
    Contains(String),
    Regex(Regex),
}

impl NameMatcher {
    /// Compile a match rule, rejecting regex patterns that do not parse
    pub fn new(match_type: MatchType, match_value: &str) -> Result<Self, DefinitionError> {
        Ok(match match_type {
            MatchType::Exact => NameMatcher::Exact(match_value.to_string()),
            MatchType::Contains => NameMatcher::Contains(match_value.to_string()),
            MatchType::Regex => {
                let re = Regex::new(match_value).map_err(|source| DefinitionError::InvalidPattern {
                    pattern: match_value.to_string(),
                    source,
                })?;
                NameMatcher::Regex(re)
            }
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        match self {
            NameMatcher::Exact(value) => name == value,
            NameMatcher::Contains(value) => name.contains(value.as_str()),
            // Unanchored search unless the pattern anchors itself
            NameMatcher::Regex(re) => re.is_match(name),
        }
    }
}

/// Whether `name` satisfies `match_value` under `match_type`
///
/// An invalid regex pattern never matches.
pub fn matches(name: &str, match_type: MatchType, match_value: &str) -> bool {
    NameMatcher::new(match_type, match_value)
        .map(|m| m.is_match(name))
        .unwrap_or(false)
}

/// Like [`matches`], but takes the match type by name
///
/// Unrecognized match types never match.
pub fn matches_str(name: &str, match_type: &str, match_value: &str) -> bool {
    match match_type.parse::<MatchType>() {
        Ok(match_type) => matches(name, match_type, match_value),
        Err(_) => {
            tracing::debug!("Ignoring unsupported match type: {}", match_type);
            false
        }
    }
}
