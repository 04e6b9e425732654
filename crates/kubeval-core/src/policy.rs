//! Coverage policy
//!
//! Some checks are alternatives to one another: either autoscaler
//! implementation satisfies the requirement for cluster scaling. The
//! policy runs after the whole batch has been evaluated and promotes the
//! missing alternative to PASS when its counterpart is present.

use crate::types::{CheckResult, CheckStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two check ids that satisfy the same operational requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceGroup {
    pub primary: String,
    pub alternative: String,
}

impl EquivalenceGroup {
    pub fn new(primary: impl Into<String>, alternative: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alternative: alternative.into(),
        }
    }

    /// Promotion this pair calls for, as `(missing, present)` indices
    ///
    /// Only a check that passed on its own evaluation can cover for its
    /// counterpart; a result already promoted by the policy cannot.
    fn promotion(&self, results: &[CheckResult]) -> Option<(usize, usize)> {
        let primary = results.iter().position(|r| r.check_id == self.primary)?;
        let alternative = results
            .iter()
            .position(|r| r.check_id == self.alternative)?;

        let (p, a) = (&results[primary], &results[alternative]);
        if p.is_present() && a.status == CheckStatus::Fail {
            Some((alternative, primary))
        } else if a.is_present() && p.status == CheckStatus::Fail {
            Some((primary, alternative))
        } else {
            None
        }
    }
}

/// Set of equivalence groups applied to a finished result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoveragePolicy {
    groups: Vec<EquivalenceGroup>,
}

impl Default for CoveragePolicy {
    /// Cluster scaling is covered by either Cluster Autoscaler or Karpenter
    fn default() -> Self {
        Self::new(vec![EquivalenceGroup::new("cluster-autoscaler", "karpenter")])
    }
}

impl CoveragePolicy {
    pub fn new(groups: Vec<EquivalenceGroup>) -> Self {
        Self { groups }
    }

    /// Policy with no groups; leaves every result untouched
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn groups(&self) -> &[EquivalenceGroup] {
        &self.groups
    }

    /// Add groups, skipping any pair already present in either orientation
    pub fn extend(&mut self, groups: impl IntoIterator<Item = EquivalenceGroup>) {
        for group in groups {
            let known = self.groups.iter().any(|g| {
                (g.primary == group.primary && g.alternative == group.alternative)
                    || (g.primary == group.alternative && g.alternative == group.primary)
            });
            if !known {
                self.groups.push(group);
            }
        }
    }

    /// Apply every group to `results` in place
    ///
    /// Must only run on a complete result set. Every group is judged against
    /// the results as evaluated, so group order does not matter and a second
    /// run changes nothing. When several groups could cover the same check,
    /// the covering check listed first in `results` wins. Returns how many
    /// results were promoted.
    pub fn reconcile(&self, results: &mut [CheckResult]) -> usize {
        let evaluated: &[CheckResult] = results;
        let mut promotions: BTreeMap<usize, usize> = BTreeMap::new();
        for (missing, present) in self.groups.iter().filter_map(|g| g.promotion(evaluated)) {
            promotions
                .entry(missing)
                .and_modify(|p| *p = (*p).min(present))
                .or_insert(present);
        }

        for (&missing, &present) in &promotions {
            let details = format!(
                "Optional: {} not installed, {} is present.",
                results[missing].title, results[present].title
            );
            let covered_by = results[present].check_id.clone();
            tracing::debug!(
                "Promoting {} to PASS, covered by {}",
                results[missing].check_id,
                covered_by
            );

            let missing = &mut results[missing];
            missing.status = CheckStatus::Pass;
            missing.details = details;
            missing.covered_by = Some(covered_by);
        }

        promotions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, title: &str, status: CheckStatus) -> CheckResult {
        CheckResult {
            check_id: id.to_string(),
            title: title.to_string(),
            status,
            details: format!("{status} details"),
            covered_by: None,
        }
    }

    fn autoscaling(autoscaler: CheckStatus, karpenter: CheckStatus) -> Vec<CheckResult> {
        vec![
            result("metrics-server", "Metrics Server", CheckStatus::Pass),
            result("cluster-autoscaler", "Cluster Autoscaler", autoscaler),
            result("karpenter", "Karpenter", karpenter),
        ]
    }

    #[test]
    fn test_karpenter_covers_missing_autoscaler() {
        let mut results = autoscaling(CheckStatus::Fail, CheckStatus::Pass);
        let changed = CoveragePolicy::default().reconcile(&mut results);

        assert_eq!(changed, 1);
        assert_eq!(results[1].status, CheckStatus::Pass);
        assert_eq!(
            results[1].details,
            "Optional: Cluster Autoscaler not installed, Karpenter is present."
        );
        assert_eq!(results[1].covered_by.as_deref(), Some("karpenter"));
        assert_eq!(results[2], result("karpenter", "Karpenter", CheckStatus::Pass));
    }

    #[test]
    fn test_autoscaler_covers_missing_karpenter() {
        let mut results = autoscaling(CheckStatus::Pass, CheckStatus::Fail);
        CoveragePolicy::default().reconcile(&mut results);

        assert_eq!(results[2].status, CheckStatus::Pass);
        assert_eq!(
            results[2].details,
            "Optional: Karpenter not installed, Cluster Autoscaler is present."
        );
    }

    #[test]
    fn test_agreement_is_left_alone() {
        for (a, k) in [
            (CheckStatus::Pass, CheckStatus::Pass),
            (CheckStatus::Fail, CheckStatus::Fail),
            (CheckStatus::Error, CheckStatus::Pass),
            (CheckStatus::Fail, CheckStatus::Error),
        ] {
            let mut results = autoscaling(a, k);
            let before = results.clone();
            assert_eq!(CoveragePolicy::default().reconcile(&mut results), 0);
            assert_eq!(results, before);
        }
    }

    #[test]
    fn test_missing_counterpart_is_left_alone() {
        let mut results = vec![result("cluster-autoscaler", "Cluster Autoscaler", CheckStatus::Fail)];
        let before = results.clone();
        CoveragePolicy::default().reconcile(&mut results);
        assert_eq!(results, before);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut once = autoscaling(CheckStatus::Fail, CheckStatus::Pass);
        let policy = CoveragePolicy::default();
        policy.reconcile(&mut once);

        let mut twice = once.clone();
        assert_eq!(policy.reconcile(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_groups_are_independent_of_order() {
        let groups = vec![
            EquivalenceGroup::new("cluster-autoscaler", "karpenter"),
            EquivalenceGroup::new("vpc-cni", "cilium"),
        ];
        let mut base = autoscaling(CheckStatus::Fail, CheckStatus::Pass);
        base.push(result("vpc-cni", "Amazon VPC CNI", CheckStatus::Fail));
        base.push(result("cilium", "Cilium", CheckStatus::Pass));

        let mut forward = base.clone();
        CoveragePolicy::new(groups.clone()).reconcile(&mut forward);

        let mut reversed = base;
        CoveragePolicy::new(groups.into_iter().rev().collect()).reconcile(&mut reversed);

        assert_eq!(forward, reversed);
        assert!(forward.iter().all(CheckResult::is_pass));
    }

    fn chained(groups: &[(&str, &str)]) -> (CoveragePolicy, Vec<CheckResult>) {
        let policy = CoveragePolicy::new(
            groups
                .iter()
                .map(|(p, a)| EquivalenceGroup::new(*p, *a))
                .collect(),
        );
        let results = vec![
            result("a", "A", CheckStatus::Pass),
            result("b", "B", CheckStatus::Fail),
            result("c", "C", CheckStatus::Fail),
        ];
        (policy, results)
    }

    #[test]
    fn test_promoted_check_cannot_cover_another() {
        for groups in [[("a", "b"), ("b", "c")], [("b", "c"), ("a", "b")]] {
            let (policy, mut results) = chained(&groups);
            assert_eq!(policy.reconcile(&mut results), 1);

            assert_eq!(results[1].status, CheckStatus::Pass);
            assert_eq!(results[1].details, "Optional: B not installed, A is present.");
            assert_eq!(results[1].covered_by.as_deref(), Some("a"));
            assert_eq!(results[2], result("c", "C", CheckStatus::Fail));
        }
    }

    #[test]
    fn test_overlapping_groups_order_and_repetition() {
        let (forward, mut once) = chained(&[("a", "b"), ("b", "c")]);
        forward.reconcile(&mut once);

        let (reversed, mut other) = chained(&[("b", "c"), ("a", "b")]);
        reversed.reconcile(&mut other);
        assert_eq!(once, other);

        let mut twice = once.clone();
        assert_eq!(forward.reconcile(&mut twice), 0);
        assert_eq!(reversed.reconcile(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_first_listed_cover_wins() {
        let base = vec![
            result("a", "A", CheckStatus::Pass),
            result("b", "B", CheckStatus::Fail),
            result("d", "D", CheckStatus::Pass),
        ];
        for groups in [
            vec![EquivalenceGroup::new("d", "b"), EquivalenceGroup::new("a", "b")],
            vec![EquivalenceGroup::new("a", "b"), EquivalenceGroup::new("b", "d")],
        ] {
            let mut results = base.clone();
            assert_eq!(CoveragePolicy::new(groups).reconcile(&mut results), 1);
            assert_eq!(results[1].covered_by.as_deref(), Some("a"));
            assert_eq!(results[1].details, "Optional: B not installed, A is present.");
        }
    }

    #[test]
    fn test_extend_skips_known_pairs() {
        let mut policy = CoveragePolicy::default();
        policy.extend([
            EquivalenceGroup::new("karpenter", "cluster-autoscaler"),
            EquivalenceGroup::new("vpc-cni", "cilium"),
        ]);
        assert_eq!(policy.groups().len(), 2);
    }

    #[test]
    fn test_empty_policy_changes_nothing() {
        let mut results = autoscaling(CheckStatus::Fail, CheckStatus::Pass);
        let before = results.clone();
        assert_eq!(CoveragePolicy::empty().reconcile(&mut results), 0);
        assert_eq!(results, before);
    }
}
