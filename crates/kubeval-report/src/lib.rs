//! kubeval-report: terminal and JSON output for kubeval
//!
//! Everything here consumes plain engine data (check results, summaries,
//! definitions); nothing in kubeval-core depends on it.

pub mod banner;
pub mod json;
pub mod progress;
pub mod style;
pub mod table;

pub use banner::render_banner;
pub use json::{ChecksPayload, ResultsPayload, to_pretty_json};
pub use progress::scan_with_spinner;
pub use style::StatusExt;
pub use table::{render_catalog, render_results, render_summary};
