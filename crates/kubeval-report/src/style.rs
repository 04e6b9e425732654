//! Status symbols and colors

use crossterm::style::{Color, Stylize};
use kubeval_core::CheckStatus;

/// Orange used by the banner and progress output
pub const ORANGE: Color = Color::AnsiValue(208);
/// Gold used by the banner tagline
pub const GOLD: Color = Color::AnsiValue(220);

/// Presentation helpers for check status
pub trait StatusExt {
    fn emoji(&self) -> &'static str;
    fn color(&self) -> Color;

    /// Emoji followed by the status name, e.g. "✅ PASS"
    fn label(&self) -> String;
}

impl StatusExt for CheckStatus {
    fn emoji(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "✅",
            CheckStatus::Fail => "❌",
            CheckStatus::Error => "⚠️",
        }
    }

    fn color(&self) -> Color {
        match self {
            CheckStatus::Pass => Color::Green,
            CheckStatus::Fail => Color::Red,
            CheckStatus::Error => Color::Yellow,
        }
    }

    fn label(&self) -> String {
        format!("{} {}", self.emoji(), self)
    }
}

/// Color `text` when `enabled`, otherwise return it unchanged
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.with(color).to_string()
    } else {
        text.to_string()
    }
}

/// Emoji prefix for a check, picked from well-known ids
pub fn title_emoji(check_id: &str) -> &'static str {
    if check_id.contains("metrics") {
        "📊"
    } else if check_id.contains("autoscaler") || check_id.contains("karpenter") {
        "📈"
    } else if check_id.contains("coredns") {
        "🌐"
    } else if check_id.contains("proxy") {
        "🔀"
    } else if check_id.contains("csi") {
        "💾"
    } else if check_id.contains("cni") {
        "🧩"
    } else {
        "🔎"
    }
}
