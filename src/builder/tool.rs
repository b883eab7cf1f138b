//! The external build tool seam.
//!
//! A [`BuildSession`](crate::builder::session::BuildSession) never spawns
//! processes itself; it hands each step's command line to a [`BuildTool`].
//! [`CMakeTool`] runs the real thing, [`DryRunTool`] only records.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::session::Step;
use crate::util::process::ProcessBuilder;

/// One command for the external build tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub step: Step,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
}

impl ToolInvocation {
    fn process(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .args(&self.args)
            .cwd(&self.cwd)
    }

    pub fn display_command(&self) -> String {
        self.process().display_command()
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolExit {
    /// Exit code; `None` if the process was killed by a signal
    pub code: Option<i32>,
}

impl ToolExit {
    pub fn success() -> Self {
        ToolExit { code: Some(0) }
    }

    pub fn code(code: i32) -> Self {
        ToolExit { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs build tool invocations.
///
/// `Err` means the invocation could not run at all; a non-zero exit is an
/// `Ok` with that code.
pub trait BuildTool {
    fn run(&mut self, invocation: &ToolInvocation) -> Result<ToolExit>;
}

impl<T: BuildTool + ?Sized> BuildTool for Box<T> {
    fn run(&mut self, invocation: &ToolInvocation) -> Result<ToolExit> {
        (**self).run(invocation)
    }
}

/// Runs invocations as real processes.
#[derive(Debug, Clone)]
pub struct CMakeTool {
    capture: bool,
}

impl CMakeTool {
    /// Child output goes straight to the terminal.
    pub fn new() -> Self {
        CMakeTool { capture: false }
    }

    /// Capture child output instead of inheriting stdio. Captured output is
    /// logged, stderr at error level when the step fails.
    pub fn captured(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }
}

impl Default for CMakeTool {
    fn default() -> Self {
        CMakeTool::new()
    }
}

impl BuildTool for CMakeTool {
    fn run(&mut self, invocation: &ToolInvocation) -> Result<ToolExit> {
        let process = invocation.process();
        tracing::debug!("running `{}` in {}", process.display_command(), invocation.cwd.display());

        if !self.capture {
            let status = process.status()?;
            return Ok(ToolExit {
                code: status.code(),
            });
        }

        let output = process.exec()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines() {
            tracing::debug!("{}", line);
        }
        if output.status.success() {
            for line in stderr.lines() {
                tracing::debug!("{}", line);
            }
        } else {
            for line in stderr.lines() {
                tracing::error!("{}", line);
            }
        }

        Ok(ToolExit {
            code: output.status.code(),
        })
    }
}

/// Logs invocations without running anything. Every step succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTool;

impl DryRunTool {
    pub fn new() -> Self {
        DryRunTool
    }
}

impl BuildTool for DryRunTool {
    fn run(&mut self, invocation: &ToolInvocation) -> Result<ToolExit> {
        tracing::info!("would run `{}`", invocation.display_command());
        Ok(ToolExit::success())
    }
}

/// Resolve the cmake program: explicit path first, then PATH.
pub fn locate_cmake(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => crate::util::process::find_cmake(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(program: &str, args: &[&str]) -> ToolInvocation {
        ToolInvocation {
            step: Step::Build,
            program: PathBuf::from(program),
            args: args.iter().map(|s| s.to_string()).collect(),
            cwd: std::env::temp_dir(),
        }
    }

    #[test]
    fn test_dry_run_never_spawns() {
        let mut tool = DryRunTool::new();
        let inv = invocation("/nonexistent/cmake", &["--build", "."]);
        assert!(tool.run(&inv).unwrap().is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_cmake_tool_reports_exit_code() {
        let mut tool = CMakeTool::new().captured(true);
        let exit = tool.run(&invocation("sh", &["-c", "echo oops >&2; exit 5"])).unwrap();
        assert_eq!(exit.code, Some(5));
        assert!(!exit.is_success());
    }

    #[test]
    fn test_cmake_tool_spawn_failure() {
        let mut tool = CMakeTool::new();
        assert!(tool.run(&invocation("/nonexistent/cmake", &[])).is_err());
    }

    #[test]
    fn test_locate_cmake_explicit() {
        let path = PathBuf::from("/opt/cmake/bin/cmake");
        assert_eq!(locate_cmake(Some(&path)), Some(path));
    }

    #[test]
    fn test_display_command() {
        let inv = invocation("cmake", &["--build", ".", "--", "ARGS=-T Test"]);
        assert_eq!(inv.display_command(), "cmake --build . -- \"ARGS=-T Test\"");
    }
}
