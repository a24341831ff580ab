//! User-friendly error formatting for the CLI.

use colored::Colorize;

use crate::error::CliError;

/// Format an error for CLI display, with suggestions when there are any.
#[must_use]
pub fn format_error(error: &CliError) -> String {
    let mut out = format!("{} {}", "Error:".red().bold(), error);

    let suggestions = error.suggestions();
    if !suggestions.is_empty() {
        out.push_str(&format!("\n\n{}", "Suggestion:".yellow()));
        for suggestion in suggestions {
            out.push_str(&format!("\n  {suggestion}"));
        }
    }
    out
}

/// Display an error to stderr and return the exit code.
#[must_use]
pub fn display_error(error: &CliError) -> i32 {
    eprintln!("{}", format_error(error));
    1
}
