//! Table and list formatting for terminal output.

use std::fmt::Write as _;

// ANSI color codes
pub const GREEN: &str = "\x1b[32m";
pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

/// Two-column property table with a bold title.
///
/// ```rust
/// use ggforge_cli::presentation::render_table;
///
/// let rows = vec![("Cores".to_string(), "4".to_string())];
/// let out = render_table("Hardware", ("Property", "Value"), &rows);
/// assert!(out.contains("Cores"));
/// ```
pub fn render_table(title: &str, header: (&str, &str), rows: &[(String, String)]) -> String {
    let width = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .chain(std::iter::once(header.0.chars().count()))
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .chain(std::iter::once(header.1.chars().count()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{BOLD}{title}{RESET}");
    let _ = writeln!(out, "{}", separator(width + value_width + 3));
    let _ = writeln!(out, "{CYAN}{:<width$}{RESET} | {}", header.0, header.1);
    let _ = writeln!(out, "{}", separator(width + value_width + 3));
    for (key, value) in rows {
        let _ = writeln!(out, "{CYAN}{key:<width$}{RESET} | {GREEN}{value}{RESET}");
    }
    out
}

pub fn separator(width: usize) -> String {
    "-".repeat(width)
}

/// The first `limit` items, plus a translated "and N more" line when cut.
pub fn truncated<'a, T: AsRef<str>>(
    items: &'a [T],
    limit: usize,
    more: impl FnOnce(usize) -> String,
) -> (Vec<&'a str>, Option<String>) {
    let shown = items.iter().take(limit).map(AsRef::as_ref).collect();
    let rest = items.len().saturating_sub(limit);
    (shown, (rest > 0).then(|| more(rest)))
}

/// Green check or red cross.
pub fn yes_no(value: bool, yes: &str, no: &str) -> String {
    if value {
        format!("{GREEN}✓ {yes}{RESET}")
    } else {
        format!("{RED}✗ {no}{RESET}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_aligns_keys() {
        let rows = vec![
            ("RAM".to_string(), "16 GB".to_string()),
            ("Physical cores".to_string(), "8".to_string()),
        ];
        let out = render_table("Hardware", ("Property", "Value"), &rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[4].contains(&format!("RAM{}", " ".repeat(11))));
        assert!(lines[5].contains("Physical cores"));
    }

    #[test]
    fn test_truncated() {
        let flags = ["a", "b", "c", "d", "e"];
        let (shown, more) = truncated(&flags, 3, |n| format!("+{n}"));
        assert_eq!(shown, vec!["a", "b", "c"]);
        assert_eq!(more.as_deref(), Some("+2"));

        let (shown, more) = truncated(&flags[..2], 3, |n| format!("+{n}"));
        assert_eq!(shown.len(), 2);
        assert!(more.is_none());
    }
}
