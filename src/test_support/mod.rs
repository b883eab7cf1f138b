//! Test utilities and mocks for Berth unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use berth::test_support::{linux_release_spec, MockTool};
//!
//! #[test]
//! fn test_example() {
//!     let tool = MockTool::new().fail_step(Step::Test, 1);
//!     let ctx = BuildContext::new("cmake", tmp.path(), "Release");
//!     let mut session = BuildSession::configure(tool, linux_release_spec(), vec![], ctx)?;
//!     // Drive the session, then inspect session.tool().calls()
//! }
//! ```

pub mod fixtures;

use anyhow::{bail, Result};

use crate::builder::session::Step;
use crate::builder::tool::{BuildTool, ToolExit, ToolInvocation};

pub use fixtures::*;

/// Pattern for matching invocations in [`MockTool`].
#[derive(Debug, Clone)]
pub enum InvocationPattern {
    /// Match every invocation of a step.
    Step(Step),
    /// Match if the displayed command contains a substring.
    Contains(String),
}

impl InvocationPattern {
    pub fn matches(&self, invocation: &ToolInvocation) -> bool {
        match self {
            InvocationPattern::Step(step) => invocation.step == *step,
            InvocationPattern::Contains(s) => invocation.display_command().contains(s.as_str()),
        }
    }
}

/// Scripted result for a matched invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    Exit(i32),
    Signal,
    SpawnError,
}

/// Mock build tool.
///
/// Records every invocation. Invocations matching no expectation succeed.
#[derive(Debug, Default)]
pub struct MockTool {
    expectations: Vec<(InvocationPattern, MockOutcome)>,
    calls: Vec<ToolInvocation>,
}

impl MockTool {
    pub fn new() -> Self {
        MockTool::default()
    }

    /// Make every invocation of `step` exit with `code`.
    pub fn fail_step(self, step: Step, code: i32) -> Self {
        self.expect(InvocationPattern::Step(step), MockOutcome::Exit(code))
    }

    /// Make `step` impossible to start.
    pub fn unspawnable(self, step: Step) -> Self {
        self.expect(InvocationPattern::Step(step), MockOutcome::SpawnError)
    }

    /// Add an expectation. Earlier expectations win.
    pub fn expect(mut self, pattern: InvocationPattern, outcome: MockOutcome) -> Self {
        self.expectations.push((pattern, outcome));
        self
    }

    /// All invocations seen so far, in order.
    pub fn calls(&self) -> &[ToolInvocation] {
        &self.calls
    }
}

impl BuildTool for MockTool {
    fn run(&mut self, invocation: &ToolInvocation) -> Result<ToolExit> {
        self.calls.push(invocation.clone());

        let outcome = self
            .expectations
            .iter()
            .find(|(pattern, _)| pattern.matches(invocation))
            .map(|(_, outcome)| *outcome)
            .unwrap_or(MockOutcome::Exit(0));

        match outcome {
            MockOutcome::Exit(code) => Ok(ToolExit::code(code)),
            MockOutcome::Signal => Ok(ToolExit { code: None }),
            MockOutcome::SpawnError => {
                bail!("mock: cannot spawn `{}`", invocation.display_command())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn inv(step: Step, args: &[&str]) -> ToolInvocation {
        ToolInvocation {
            step,
            program: PathBuf::from("cmake"),
            args: args.iter().map(|s| s.to_string()).collect(),
            cwd: PathBuf::from("/b"),
        }
    }

    #[test]
    fn test_default_success_and_recording() {
        let mut tool = MockTool::new();
        assert!(tool.run(&inv(Step::Build, &["--build", "."])).unwrap().is_success());
        assert_eq!(tool.calls().len(), 1);
    }

    #[test]
    fn test_first_expectation_wins() {
        let mut tool = MockTool::new()
            .expect(InvocationPattern::Contains("ARGS=-T Test".into()), MockOutcome::Exit(8))
            .fail_step(Step::Test, 1);

        let exit = tool.run(&inv(Step::Test, &["--", "ARGS=-T Test"])).unwrap();
        assert_eq!(exit.code, Some(8));
        let exit = tool.run(&inv(Step::Test, &["--target", "test"])).unwrap();
        assert_eq!(exit.code, Some(1));
    }

    #[test]
    fn test_signal_and_spawn_error() {
        let mut tool = MockTool::new()
            .expect(InvocationPattern::Step(Step::Build), MockOutcome::Signal)
            .unspawnable(Step::Configure);
        assert_eq!(tool.run(&inv(Step::Build, &[])).unwrap().code, None);
        assert!(tool.run(&inv(Step::Configure, &[])).is_err());
    }
}
