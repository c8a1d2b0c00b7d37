//! Terminal rendering helpers for command results.

use colored::Colorize;

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// `[PASS] msg` / `[FAIL] msg`, coloured when stdout is a terminal.
pub fn status_line(ok: bool, message: &str) -> String {
    if ok {
        format!("{} {}", "[PASS]".bright_green(), message)
    } else {
        format!("{} {}", "[FAIL]".bright_red().bold(), message)
    }
}

/// Numbered list, one item per line, as printed by `list-sections`.
pub fn numbered(items: &[&str]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{:2}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}
