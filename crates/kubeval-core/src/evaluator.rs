//! Check evaluation
//!
//! Each check issues its own query; nothing is cached between checks, even
//! when several target the same resource kind.

use crate::query::ResourceQuery;
use crate::types::{CheckDefinition, CheckResult, CheckStatus};
use futures::stream::{self, StreamExt};

/// Evaluate a single check against the cluster
///
/// A query failure yields ERROR with the adapter's message verbatim.
pub async fn evaluate<Q>(check: &CheckDefinition, query: &Q) -> CheckResult
where
    Q: ResourceQuery + ?Sized,
{
    tracing::debug!(
        check_id = check.check_id(),
        resource = check.resource(),
        namespace = check.scope_label(),
        "Querying resources"
    );

    let resources = match query
        .get_resources(check.resource(), check.namespace())
        .await
    {
        Ok(resources) => resources,
        Err(e) => {
            tracing::warn!("Check {} failed to query {}: {}", check.check_id(), check.resource(), e);
            return CheckResult::new(check, CheckStatus::Error, e.message());
        }
    };

    let matched: Vec<String> = resources
        .iter()
        .filter(|r| check.matches(&r.name))
        .map(|r| r.to_string())
        .collect();

    tracing::debug!(
        check_id = check.check_id(),
        observed = resources.len(),
        matched = matched.len(),
        "Evaluated check"
    );

    if matched.len() >= check.min_count() {
        return CheckResult::new(
            check,
            CheckStatus::Pass,
            format!("Found: {}", matched.join(", ")),
        );
    }

    let shortfall = if matched.is_empty() {
        "none matched".to_string()
    } else {
        format!("only {} matched", matched.len())
    };

    CheckResult::new(
        check,
        CheckStatus::Fail,
        format!(
            "Expected at least {} match(es) for {} in {}; {} {}='{}'",
            check.min_count(),
            check.resource(),
            check.scope_label(),
            shortfall,
            check.match_type(),
            check.match_value()
        ),
    )
}

/// Evaluate checks one after another, preserving input order
pub async fn evaluate_all<Q>(checks: &[CheckDefinition], query: &Q) -> Vec<CheckResult>
where
    Q: ResourceQuery + ?Sized,
{
    let mut results = Vec::with_capacity(checks.len());
    for check in checks {
        results.push(evaluate(check, query).await);
    }
    results
}

/// Evaluate up to `limit` checks at a time
///
/// Results come back in input order regardless of completion order. A
/// `limit` of zero is treated as one.
pub async fn evaluate_concurrent<Q>(
    checks: &[CheckDefinition],
    query: &Q,
    limit: usize,
) -> Vec<CheckResult>
where
    Q: ResourceQuery + ?Sized,
{
    stream::iter(checks)
        .map(|check| evaluate(check, query))
        .buffered(limit.max(1))
        .collect()
        .await
}
