//! Centralized shell output.
//!
//! The Shell provides a unified API for all CLI output:
//! - Status messages with consistent formatting
//! - JSON output mode for machine-readable output
//!
//! Human and JSON output are mutually exclusive: in JSON mode nothing but
//! events is written, one object per line on stdout.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

/// Shell output mode - Human and Json are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    /// Human-readable output with optional colors.
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    /// Machine-readable JSON output only.
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Output verbosity level (Human mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only
    Quiet,
    /// Default: status messages
    #[default]
    Normal,
    /// --verbose: status messages plus the commands being run
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
///
/// Shell handles all formatting - callers just specify the semantic status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Created,
    Finished,

    // In-progress statuses (cyan)
    Resolving,
    Configuring,
    Building,
    Testing,
    Importing,

    // Info statuses (blue/default)
    Info,
    Running,

    // Warning statuses (yellow)
    Skipped,
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    /// Get the display text for this status.
    fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "Created",
            Status::Finished => "Finished",
            Status::Resolving => "Resolving",
            Status::Configuring => "Configuring",
            Status::Building => "Building",
            Status::Testing => "Testing",
            Status::Importing => "Importing",
            Status::Info => "Info",
            Status::Running => "Running",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    /// Get the ANSI color code for this status.
    fn color_code(&self) -> &'static str {
        match self {
            // Success: bold green
            Status::Created | Status::Finished => "\x1b[1;32m",
            // In-progress: bold cyan
            Status::Resolving
            | Status::Configuring
            | Status::Building
            | Status::Testing
            | Status::Importing => "\x1b[1;36m",
            // Info: bold blue
            Status::Info | Status::Running => "\x1b[1;34m",
            // Warning: bold yellow
            Status::Skipped | Status::Warning => "\x1b[1;33m",
            // Error: bold red
            Status::Error => "\x1b[1;31m",
        }
    }

    /// Get the width for alignment (12 characters).
    fn width(&self) -> usize {
        12
    }
}

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
}

impl Shell {
    /// Create a new shell with the given mode.
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell { mode, use_color }
    }

    /// Create a shell from CLI flags with proper precedence.
    ///
    /// JSON mode takes precedence over quiet/verbose.
    pub fn from_flags(
        quiet: bool,
        verbose: bool,
        color: ColorChoice,
        message_format_json: bool,
    ) -> Self {
        let mode = if message_format_json {
            ShellMode::Json
        } else {
            let verbosity = if quiet {
                Verbosity::Quiet
            } else if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Normal
            };
            ShellMode::Human { verbosity, color }
        };

        Shell::new(mode)
    }

    /// Check if shell is in JSON mode.
    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    /// Check if colors are enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`
    ///
    /// In quiet mode, only Error status is printed.
    /// In JSON mode, messages are silently ignored (use json_event for JSON output).
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.shows(status, false) {
            eprintln!("{} {}", self.format_status(status), msg);
        }
    }

    /// Print a status message only in verbose mode.
    pub fn verbose(&self, status: Status, msg: impl Display) {
        if self.shows(status, true) {
            eprintln!("{} {}", self.format_status(status), msg);
        }
    }

    /// Whether a status line is printed in the current mode.
    fn shows(&self, status: Status, verbose_only: bool) -> bool {
        match self.mode {
            ShellMode::Json => false,
            ShellMode::Human { verbosity, .. } => match verbosity {
                Verbosity::Quiet => status == Status::Error,
                Verbosity::Normal => !verbose_only,
                Verbosity::Verbose => true,
            },
        }
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print an error message.
    ///
    /// In JSON mode, this outputs a JSON error event.
    pub fn error(&self, msg: impl Display) {
        if self.is_json() {
            let event = serde_json::json!({
                "reason": "error",
                "message": msg.to_string()
            });
            self.json_event(&event);
        } else {
            self.status(Status::Error, msg);
        }
    }

    /// Print a JSON event to stdout.
    ///
    /// Only works in JSON mode; silently ignored in human mode.
    pub fn json_event(&self, event: &serde_json::Value) {
        if !self.is_json() {
            return;
        }

        let json_str = serde_json::to_string(event).unwrap_or_default();
        println!("{}", json_str);
        let _ = io::stdout().flush();
    }

    /// Format a status prefix with optional color.
    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        let width = status.width();

        if self.use_color {
            let color = status.color_code();
            format!("{}{:>width$}\x1b[0m", color, text, width = width)
        } else {
            format!("{:>width$}", text, width = width)
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

/// Format a duration in a human-readable way.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_choice_parse() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!("always".parse::<ColorChoice>().unwrap(), ColorChoice::Always);
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("invalid".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "0.50s");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn test_status_formatting() {
        let shell = Shell::new(ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Never,
        });

        let formatted = shell.format_status(Status::Configuring);
        assert_eq!(formatted.trim(), "Configuring");
        assert_eq!(formatted.len(), 12); // Right-aligned to 12 chars

        let colored = Shell::new(ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Always,
        })
        .format_status(Status::Error);
        assert!(colored.starts_with("\x1b[1;31m"));
        assert!(colored.ends_with("\x1b[0m"));
    }

    #[test]
    fn test_status_gating_by_verbosity() {
        let normal = Shell::from_flags(false, false, ColorChoice::Never, false);
        assert!(normal.shows(Status::Configuring, false));
        assert!(!normal.shows(Status::Running, true));

        let verbose = Shell::from_flags(false, true, ColorChoice::Never, false);
        assert!(verbose.shows(Status::Running, true));
        assert!(verbose.shows(Status::Testing, false));

        let quiet = Shell::from_flags(true, false, ColorChoice::Never, false);
        assert!(!quiet.shows(Status::Building, false));
        assert!(!quiet.shows(Status::Skipped, true));
        assert!(quiet.shows(Status::Error, false));

        let json = Shell::from_flags(false, true, ColorChoice::Never, true);
        assert!(!json.shows(Status::Error, false));
        assert!(!json.shows(Status::Importing, true));
    }

    #[test]
    fn test_step_statuses_align() {
        let shell = Shell::from_flags(false, false, ColorChoice::Never, false);
        assert_eq!(shell.format_status(Status::Configuring), " Configuring");
        assert_eq!(shell.format_status(Status::Testing), "     Testing");
        assert_eq!(shell.format_status(Status::Importing), "   Importing");
        assert_eq!(shell.format_status(Status::Resolving), "   Resolving");

        let colored = Shell::from_flags(false, false, ColorChoice::Always, false);
        assert_eq!(
            colored.format_status(Status::Importing),
            "\x1b[1;36m   Importing\x1b[0m"
        );
        assert!(colored
            .format_status(Status::Skipped)
            .starts_with("\x1b[1;33m"));
    }

    #[test]
    fn test_from_flags() {
        let shell = Shell::from_flags(true, false, ColorChoice::Never, false);
        assert_eq!(
            shell.mode,
            ShellMode::Human {
                verbosity: Verbosity::Quiet,
                color: ColorChoice::Never
            }
        );
        assert!(!shell.use_color());

        // JSON wins over quiet and verbose, and never colours.
        let shell = Shell::from_flags(true, true, ColorChoice::Always, true);
        assert!(shell.is_json());
        assert!(!shell.use_color());
    }
}
