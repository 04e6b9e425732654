//! Result aggregation

use crate::types::{CheckResult, CheckStatus};
use serde::{Deserialize, Serialize};

/// Tally of results by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "PASS")]
    pub pass: usize,
    #[serde(rename = "FAIL")]
    pub fail: usize,
    #[serde(rename = "ERROR")]
    pub error: usize,
}

impl Summary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            match result.status {
                CheckStatus::Pass => summary.pass += 1,
                CheckStatus::Fail => summary.fail += 1,
                CheckStatus::Error => summary.error += 1,
            }
            summary
        })
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        match status {
            CheckStatus::Pass => self.pass,
            CheckStatus::Fail => self.fail,
            CheckStatus::Error => self.error,
        }
    }

    pub fn total(&self) -> usize {
        self.pass + self.fail + self.error
    }

    pub fn is_success(&self) -> bool {
        self.fail == 0 && self.error == 0
    }

    /// Process exit status: 1 when anything failed or errored, else 0
    pub fn exit_status(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PASS={} FAIL={} ERROR={}",
            self.pass, self.fail, self.error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(statuses: &[CheckStatus]) -> Vec<CheckResult> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| CheckResult {
                check_id: format!("check-{i}"),
                title: format!("Check {i}"),
                status: *status,
                details: String::new(),
                covered_by: None,
            })
            .collect()
    }

    #[test]
    fn test_mixed_results_exit_nonzero() {
        use CheckStatus::*;
        let summary = Summary::from_results(&results(&[Pass, Pass, Fail, Pass, Error]));
        assert_eq!(summary.pass, 3);
        assert_eq!(summary.fail, 1);
        assert_eq!(summary.error, 1);
        assert_eq!(summary.total(), 5);
        assert_ne!(summary.exit_status(), 0);
    }

    #[test]
    fn test_all_pass_exits_zero() {
        let summary = Summary::from_results(&results(&[CheckStatus::Pass; 4]));
        assert_eq!(summary.exit_status(), 0);
        assert_eq!(summary.count(CheckStatus::Fail), 0);
    }

    #[test]
    fn test_error_alone_is_failure() {
        let summary = Summary::from_results(&results(&[CheckStatus::Error]));
        assert_eq!(summary.exit_status(), 1);
    }

    #[test]
    fn test_empty_summary_defaults_to_zero() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.exit_status(), 0);
    }

    #[test]
    fn test_summary_json_keys() {
        let summary = Summary {
            pass: 2,
            fail: 1,
            error: 0,
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json, serde_json::json!({"PASS": 2, "FAIL": 1, "ERROR": 0}));
        assert_eq!(summary.to_string(), "PASS=2 FAIL=1 ERROR=0");
    }
}
