//! Recipe run errors.
//!
//! Every failure of a recipe run is one of these. Step failures carry the
//! external tool's exit code so the process can exit with it unchanged.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::builder::session::{Stage, Step};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised by a recipe run.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RecipeError {
    /// Malformed or incomplete settings, requirements or recipe. Raised
    /// before any external command runs.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(berth::configuration))]
    Configuration { message: String },

    #[error("no Berth.toml found in {} or any parent directory", dir.display())]
    #[diagnostic(code(berth::no_recipe))]
    NoRecipe { dir: PathBuf },

    #[error("configure step failed with exit code {code}")]
    #[diagnostic(code(berth::configure), help("rerun with --verbose to see the cmake command"))]
    Configure { code: i32 },

    #[error("build step failed with exit code {code}")]
    #[diagnostic(code(berth::build))]
    Build { code: i32 },

    /// The project's own tests failed. Not a defect in the run itself.
    #[error("tests failed with exit code {code}")]
    #[diagnostic(code(berth::test))]
    TestFailure { code: i32 },

    /// The tool for `step` could not be started, or exited without a code.
    #[error("{step} step could not run: {message}")]
    #[diagnostic(code(berth::spawn))]
    Spawn { step: Step, message: String },

    #[error("cannot run {step} step while {stage}")]
    #[diagnostic(code(berth::invalid_state))]
    InvalidState { step: Step, stage: Stage },

    #[error("artifact import failed: {message}")]
    #[diagnostic(code(berth::import))]
    Import { message: String },
}

impl RecipeError {
    pub fn configuration(message: impl Into<String>) -> Self {
        RecipeError::Configuration {
            message: message.into(),
        }
    }

    /// Map a non-zero exit of `step` to its error.
    pub fn step_failed(step: Step, code: i32) -> Self {
        match step {
            Step::Configure => RecipeError::Configure { code },
            Step::Build => RecipeError::Build { code },
            Step::Test => RecipeError::TestFailure { code },
            // Import never runs an external tool.
            Step::Import => RecipeError::Import {
                message: format!("exit code {}", code),
            },
        }
    }

    /// The step this error belongs to, if any.
    pub fn step(&self) -> Option<Step> {
        match self {
            RecipeError::Configuration { .. } | RecipeError::NoRecipe { .. } => None,
            RecipeError::Configure { .. } => Some(Step::Configure),
            RecipeError::Build { .. } => Some(Step::Build),
            RecipeError::TestFailure { .. } => Some(Step::Test),
            RecipeError::Spawn { step, .. } | RecipeError::InvalidState { step, .. } => Some(*step),
            RecipeError::Import { .. } => Some(Step::Import),
        }
    }

    /// The process exit code for this error.
    ///
    /// Tool failures pass the tool's code through; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RecipeError::Configure { code }
            | RecipeError::Build { code }
            | RecipeError::TestFailure { code } => *code,
            _ => 1,
        }
    }

    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            RecipeError::Configuration { .. } => diag.with_suggestion(suggestions::CHECK_RECIPE),
            RecipeError::NoRecipe { .. } => diag.with_suggestion(suggestions::NO_RECIPE),
            RecipeError::Configure { .. } | RecipeError::Build { .. } => {
                diag.with_suggestion(suggestions::BUILD_FAILED)
            }
            RecipeError::TestFailure { .. } => diag
                .with_context("the project's test runner reported failures")
                .with_suggestion(suggestions::TEST_FAILED),
            RecipeError::Spawn { .. } => diag.with_suggestion(suggestions::CMAKE_MISSING),
            RecipeError::InvalidState { .. } | RecipeError::Import { .. } => diag,
        }
    }
}
