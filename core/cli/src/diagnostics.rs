//! User-visible diagnostic rendering: a color-coded kind and message, the offending
//! source line with a column marker, and the immediately surrounding lines for context,
//! per SPEC_FULL.md §7.

use colored::Colorize;
use theta_ast::diagnostic::Diagnostic;

pub(crate) fn print(source: &str, diagnostic: &Diagnostic) {
    eprintln!("{}: {}", diagnostic.kind.to_string().red().bold(), diagnostic.message);

    let Some(location) = diagnostic.location else {
        return;
    };
    let lines: Vec<&str> = source.lines().collect();
    let Some(line_index) = (location.start_line as usize).checked_sub(1) else {
        return;
    };
    if line_index >= lines.len() {
        return;
    }

    if line_index > 0 {
        print_line(location.start_line - 1, lines[line_index - 1]);
    }
    print_line(location.start_line, lines[line_index]);

    let gutter_width = format!("{}", location.start_line).len();
    let marker_column = location.start_column.saturating_sub(1) as usize;
    eprintln!("{} | {}^", " ".repeat(gutter_width), " ".repeat(marker_column));

    if line_index + 1 < lines.len() {
        print_line(location.start_line + 1, lines[line_index + 1]);
    }
}

fn print_line(number: u32, text: &str) {
    eprintln!("{number} | {text}");
}
