//! Output formats for command results.

use clap::ValueEnum;
use serde::Serialize;

use crate::error::CliResult;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output (default)
    Human,
    /// JSON for scripting
    Json,
}

impl OutputFormat {
    /// Whether results should be written as JSON.
    pub fn is_json(self) -> bool {
        self == Self::Json
    }
}

/// Write `value` to stdout as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`CliError::Json`](crate::error::CliError::Json) if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json() {
        assert!(OutputFormat::Json.is_json());
        assert!(!OutputFormat::Human.is_json());
    }
}
