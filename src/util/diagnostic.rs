//! User-friendly diagnostic messages.
//!
//! Every error printed by the CLI carries its root cause, any context lines,
//! and suggested fixes.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no recipe file is found.
    pub const NO_RECIPE: &str = "Run `berth init` to create a Berth.toml";

    /// Suggestion when the recipe or settings are invalid.
    pub const CHECK_RECIPE: &str =
        "Check the [settings] table and `requires` in Berth.toml, or pass `-s key=value`";

    /// Suggestion when configure or build fails.
    pub const BUILD_FAILED: &str = "Run `berth --verbose build` for the exact cmake commands";

    /// Suggestion when the project's tests fail.
    pub const TEST_FAILED: &str = "Inspect Testing/ in the build directory for the test report";

    /// Suggestion when cmake cannot be started.
    pub const CMAKE_MISSING: &str =
        "Install CMake, or point `cmake.program` in .berth/config.toml at it";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = match (color, self.severity) {
            (true, Severity::Error) => "\x1b[1;31merror\x1b[0m".to_string(),
            (true, Severity::Warning) => "\x1b[1;33mwarning\x1b[0m".to_string(),
            (false, severity) => severity.to_string(),
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            for suggestion in &self.suggestions {
                output.push_str(&format!("{}: {}\n", help_prefix, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("tests failed with exit code 1")
            .with_location("Berth.toml")
            .with_context("the project's test runner reported failures")
            .with_suggestion(suggestions::TEST_FAILED);

        let output = diag.format(false);
        assert!(output.starts_with("error: tests failed"));
        assert!(output.contains("--> Berth.toml"));
        assert!(output.contains("= the project's test runner"));
        assert!(output.contains("help: Inspect Testing/"));
    }

    #[test]
    fn test_warning_severity() {
        let diag = Diagnostic::warning("no artifacts matched");
        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.format(false).starts_with("warning: "));
    }
}
