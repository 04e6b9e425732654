//! Animated progress while a scan runs
//!
//! Checks run one at a time; the spinner redraws on a timer while the
//! current check's query is in flight, then leaves a "Finished" line.

use crate::style::{ORANGE, StatusExt, paint};
use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::Color,
    terminal::{Clear, ClearType},
};
use kubeval_core::{CheckDefinition, CheckResult, ResourceQuery, evaluate};
use std::io::{self, Write};
use std::time::Duration;

const FRAMES: [&str; 5] = ["[■□□□□]", "[□■□□□]", "[□□■□□]", "[□□□■□]", "[□□□□■]"];
const FRAME_COLORS: [Color; 3] = [Color::Red, ORANGE, Color::Yellow];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Evaluate `checks` in order, drawing progress to `out`
///
/// Produces the same results as [`kubeval_core::evaluate_all`].
pub async fn scan_with_spinner<Q, W>(
    checks: &[CheckDefinition],
    query: &Q,
    out: &mut W,
    color: bool,
) -> io::Result<Vec<CheckResult>>
where
    Q: ResourceQuery + ?Sized,
    W: Write,
{
    let total = checks.len();
    let mut results = Vec::with_capacity(total);

    for (idx, check) in checks.iter().enumerate() {
        let position = idx + 1;
        let evaluation = evaluate(check, query);
        tokio::pin!(evaluation);

        let mut ticker = tokio::time::interval(FRAME_INTERVAL);
        let mut frame = 0usize;
        let result = loop {
            tokio::select! {
                result = &mut evaluation => break result,
                _ = ticker.tick() => {
                    write!(
                        out,
                        "\r{} {} {}/{}: {:<45}",
                        paint(FRAMES[frame % FRAMES.len()], FRAME_COLORS[frame % FRAME_COLORS.len()], color),
                        paint("Scanning", Color::Yellow, color),
                        position,
                        total,
                        check.title()
                    )?;
                    out.flush()?;
                    frame += 1;
                }
            }
        };

        queue!(out, Clear(ClearType::CurrentLine), MoveToColumn(0))?;
        writeln!(
            out,
            "{} {} {}/{}: {} -> {:<5}",
            paint(result.status.emoji(), result.status.color(), color),
            paint("Finished", ORANGE, color),
            position,
            total,
            check.check_id(),
            result.status
        )?;
        out.flush()?;
        results.push(result);
    }

    writeln!(out)?;
    Ok(results)
}
