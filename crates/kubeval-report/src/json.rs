//! JSON payloads for machine-readable output

use chrono::{DateTime, Utc};
use kubeval_core::{CheckDefinition, CheckResult, CheckSpec, Summary};
use serde::Serialize;

/// `scan --output json`
#[derive(Debug, Serialize)]
pub struct ResultsPayload<'a> {
    pub summary: Summary,
    pub results: &'a [CheckResult],
    pub generated_at: DateTime<Utc>,
}

impl<'a> ResultsPayload<'a> {
    pub fn new(results: &'a [CheckResult]) -> Self {
        Self {
            summary: Summary::from_results(results),
            results,
            generated_at: Utc::now(),
        }
    }
}

/// `list-checks --output json`
#[derive(Debug, Serialize)]
pub struct ChecksPayload {
    pub count: usize,
    pub checks: Vec<CheckSpec>,
}

impl ChecksPayload {
    pub fn new(checks: &[CheckDefinition]) -> Self {
        Self {
            count: checks.len(),
            checks: checks.iter().map(CheckDefinition::to_spec).collect(),
        }
    }
}

/// Pretty-print a payload
pub fn to_pretty_json<T: Serialize>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}
