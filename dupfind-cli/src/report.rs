use console::style;
use dupfind_core::RenderedRepeat;

/// Wraps `text` in red when stdout is a terminal, matching `cur.py`'s
/// `colored_red = lambda x: colored(x, 'white', 'on_red') if stdout.isatty() else x`.
pub fn colored_red(text: &str) -> String {
    if console::Term::stdout().is_term() {
        style(text).red().to_string()
    } else {
        text.to_string()
    }
}

/// Formats one repeat's report block: a severity header, an `@`-prefixed
/// locations line, then the repeat's canonical lines.
pub fn format_repeat(severity: i64, count: usize, rendered: &RenderedRepeat) -> String {
    let mut out = String::new();
    out.push_str(&colored_red(&format!(
        "severity {}: {} repeats of length {}",
        severity,
        count,
        rendered.lines.len()
    )));
    out.push('\n');

    let locations: String = rendered
        .locations
        .iter()
        .map(|(basename, lineno)| format!("({},{}) ", basename, lineno))
        .collect();
    out.push_str(&colored_red(&format!("@ {}", locations.trim_end())));
    out.push('\n');

    for line in &rendered.lines {
        out.push('\t');
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn format_summary(total_severity: i64, total_lines: usize, previous: Option<(i64, usize)>) -> String {
    let mut out = colored_red(&format!(
        "{}/{} lines can be refactored",
        total_severity, total_lines
    ));
    if let Some((prev_severity, prev_lines)) = previous {
        out.push('\n');
        out.push_str(&colored_red(&format!(
            "last run it was {}/{} lines",
            prev_severity, prev_lines
        )));
    }
    out
}
