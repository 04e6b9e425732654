//! Error types for kubeval-core

use std::path::PathBuf;
use thiserror::Error;

/// A check definition that violates its construction invariants
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// Match type outside of exact/contains/regex
    #[error("unsupported match_type '{0}'")]
    UnsupportedMatchType(String),

    /// Minimum count below one
    #[error("min_count must be at least 1, got {0}")]
    InvalidMinCount(i64),

    /// Regex pattern that does not compile
    #[error("invalid regex '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Required field present but blank
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// Record does not have the expected shape (missing key, wrong type)
    #[error("{0}")]
    Malformed(String),
}

/// Errors raised while loading check catalogs
#[derive(Error, Debug)]
pub enum CatalogError {
    /// IO error reading a checks file
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON document
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML document
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Built-in definition failed validation
    #[error("Invalid built-in check definition '{name}': {source}")]
    InvalidBuiltin {
        name: &'static str,
        #[source]
        source: DefinitionError,
    },

    /// Custom definition failed validation (1-based index)
    #[error("Invalid custom check #{index}: {source}")]
    InvalidCustom {
        index: usize,
        #[source]
        source: DefinitionError,
    },

    /// Two definitions share an id
    #[error("Duplicate check id '{0}'")]
    DuplicateId(String),

    /// Equivalence group refers to an empty id or pairs a check with itself
    #[error("Invalid equivalence group #{index}: {reason}")]
    InvalidGroup { index: usize, reason: String },
}

/// Failure reported by a resource query adapter
///
/// Only the message is carried across the port; the evaluator copies it
/// verbatim into the ERROR result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_displays_message_verbatim() {
        let err = QueryError::new("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.message(), "connection refused");
    }

    #[test]
    fn custom_error_names_index() {
        let err = CatalogError::InvalidCustom {
            index: 3,
            source: DefinitionError::UnsupportedMatchType("glob".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Invalid custom check #3: unsupported match_type 'glob'"
        );
    }
}
