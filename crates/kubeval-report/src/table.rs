//! Plain-text tables for results and the check catalog

use crate::style::{StatusExt, paint, title_emoji};
use kubeval_core::{CheckDefinition, CheckResult, Summary};
use std::fmt::Write;

/// Widest of `min` and the char counts yielded by `widths`
fn column_width(min: usize, widths: impl Iterator<Item = usize>) -> usize {
    widths.fold(min, usize::max)
}

fn titled(check_id: &str, title: &str) -> String {
    format!("{} {}", title_emoji(check_id), title)
}

/// Render scan results as a table; status cells are colored when `color`
pub fn render_results(results: &[CheckResult], color: bool) -> String {
    let id_w = column_width(8, results.iter().map(|r| r.check_id.chars().count()));
    let status_w = column_width(8, results.iter().map(|r| r.status.label().chars().count()));
    let title_w = column_width(14, results.iter().map(|r| r.title.chars().count() + 2));

    let header = format!(
        "{:<id_w$}  {:<status_w$}  {:<title_w$}  DETAILS",
        "CHECK ID", "STATUS", "TITLE"
    );

    let mut out = String::new();
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "-".repeat(header.chars().count()));
    for result in results {
        // Pad before coloring so escape codes do not count toward width
        let status = format!("{:<status_w$}", result.status.label());
        let _ = writeln!(
            out,
            "{:<id_w$}  {}  {:<title_w$}  {}",
            result.check_id,
            paint(&status, result.status.color(), color),
            titled(&result.check_id, &result.title),
            result.details
        );
    }
    out
}

/// Render the check catalog as a table
pub fn render_catalog(checks: &[CheckDefinition]) -> String {
    let id_w = column_width(8, checks.iter().map(|c| c.check_id().chars().count()));
    let resource_w = column_width(8, checks.iter().map(|c| c.resource().chars().count()));
    let title_w = column_width(14, checks.iter().map(|c| c.title().chars().count() + 2));

    let header = format!(
        "{:<id_w$}  {:<resource_w$}  {:<title_w$}  MATCH",
        "CHECK ID", "RESOURCE", "TITLE"
    );

    let mut out = String::new();
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "-".repeat(header.chars().count()));
    for check in checks {
        let scope = check.namespace().unwrap_or("all-namespaces");
        let _ = writeln!(
            out,
            "{:<id_w$}  {:<resource_w$}  {:<title_w$}  {}:{} ({})",
            check.check_id(),
            check.resource(),
            titled(check.check_id(), check.title()),
            check.match_type(),
            check.match_value(),
            scope
        );
    }
    out
}

/// One-line summary shown under the results table
pub fn render_summary(summary: &Summary) -> String {
    format!("Summary: {summary}")
}
