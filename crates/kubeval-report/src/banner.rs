//! Startup banner

use crate::style::{GOLD, ORANGE, paint};
use crossterm::style::Color;

const BANNER: &str = r"
 _  ___   _ ____  _____  __     ___    _     ___ ____    _  _____ ___  ____
| |/ / | | | __ )| ____| \ \   / / \  | |   |_ _|  _ \  / \|_   _/ _ \|  _ \
| ' /| | | |  _ \|  _|    \ \ / / _ \ | |    | || | | |/ _ \ | || | | | |_) |
| . \| |_| | |_) | |___    \ V / ___ \| |___ | || |_| / ___ \| || |_| |  _ <
|_|\_\\___/|____/|_____|    \_/_/   \_\_____|___|____/_/   \_\_| \___/|_| \_\
                  K U B E R N E T E S   C L U S T E R   C H E C K E R
";

/// Banner text, one color per line when `color` is set
pub fn render_banner(color: bool) -> String {
    let lines: Vec<&str> = BANNER.lines().filter(|l| !l.trim().is_empty()).collect();
    if !color {
        let mut out = lines.join("\n");
        out.push('\n');
        return out;
    }

    let palette = [Color::Red, ORANGE, Color::Yellow];
    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate() {
        out.push_str(&paint(line, palette[idx.min(palette.len() - 1)], true));
        out.push('\n');
    }
    out.push_str(&format!(
        "{}  {}  {}\n",
        paint("🕹️  CONTRA MODE", GOLD, true),
        paint("⚡ fast checks", Color::Yellow, true),
        paint("🎯 clear signal", ORANGE, true)
    ));
    out
}
