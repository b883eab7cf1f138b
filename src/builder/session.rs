//! The recipe orchestrator.
//!
//! A [`BuildSession`] binds validated settings and requirements to a build
//! tool and walks it through configure, build, test and import:
//!
//! ```text
//! Unconfigured -> Configured -> Built -> Tested -> ArtifactsImported
//!       \______________\___________\________\______> Failed(step, code)
//! ```
//!
//! Each step requires the previous one to have succeeded. A failed step is
//! terminal: nothing is retried and every later call is rejected.

use std::fmt;

use serde::Serialize;

use crate::builder::cmake::CMakeCommands;
use crate::builder::context::BuildContext;
use crate::builder::definitions::{Definitions, BUILD_TESTING};
use crate::builder::errors::RecipeError;
use crate::builder::tool::{BuildTool, ToolInvocation};
use crate::core::requirement::{validate_requirements, Requirement};
use crate::core::settings::{Settings, SettingsSpec};
use crate::ops::imports::{import_artifacts, ImportReport, ImportRule};
use crate::resolver::{NullResolver, Resolver};
use crate::util::fs::ensure_dir;

/// A step of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Configure,
    Build,
    Test,
    Import,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Configure => "configure",
            Step::Build => "build",
            Step::Test => "test",
            Step::Import => "import",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unconfigured,
    Configured,
    Built,
    Tested,
    ArtifactsImported,
    Failed { step: Step, code: Option<i32> },
}

impl Stage {
    /// The stage a step must start from.
    fn required_for(step: Step) -> Stage {
        match step {
            Step::Configure => Stage::Unconfigured,
            Step::Build => Stage::Configured,
            Step::Test => Stage::Built,
            Step::Import => Stage::Tested,
        }
    }

    /// The stage a step leads to on success.
    fn after(step: Step) -> Stage {
        match step {
            Step::Configure => Stage::Configured,
            Step::Build => Stage::Built,
            Step::Test => Stage::Tested,
            Step::Import => Stage::ArtifactsImported,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Stage::Failed { .. })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Unconfigured => f.write_str("unconfigured"),
            Stage::Configured => f.write_str("configured"),
            Stage::Built => f.write_str("built"),
            Stage::Tested => f.write_str("tested"),
            Stage::ArtifactsImported => f.write_str("artifacts imported"),
            Stage::Failed { step, code: Some(code) } => {
                write!(f, "failed at {} (exit code {})", step, code)
            }
            Stage::Failed { step, code: None } => write!(f, "failed at {}", step),
        }
    }
}

/// One orchestrated run against a build tool.
pub struct BuildSession<T: BuildTool> {
    tool: T,
    settings: Settings,
    requirements: Vec<Requirement>,
    definitions: Definitions,
    ctx: BuildContext,
    resolver: Box<dyn Resolver>,
    stage: Stage,
}

impl<T: BuildTool> BuildSession<T> {
    /// Validate settings and requirements and bind them to `tool`.
    ///
    /// Nothing is executed. Test targets are enabled by default.
    pub fn configure(
        tool: T,
        settings: SettingsSpec,
        requirements: Vec<Requirement>,
        ctx: BuildContext,
    ) -> Result<Self, RecipeError> {
        let settings = settings.validate()?;
        validate_requirements(&requirements)?;

        let mut definitions = Definitions::new();
        definitions.insert(BUILD_TESTING, "ON");

        tracing::debug!(
            "session bound: {} with {} requirement(s)",
            settings,
            requirements.len()
        );

        Ok(BuildSession {
            tool,
            settings,
            requirements,
            definitions,
            ctx,
            resolver: Box::new(NullResolver),
            stage: Stage::Unconfigured,
        })
    }

    /// Use `resolver` to locate requirements at configure time.
    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Record definitions for the configure step. Later values for a key
    /// replace earlier ones.
    pub fn apply_definitions<I, K, V>(&mut self, defs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.definitions.extend(defs);
        self
    }

    /// Turn test target builds on or off.
    pub fn set_build_testing(&mut self, enabled: bool) -> &mut Self {
        self.definitions
            .insert(BUILD_TESTING, if enabled { "ON" } else { "OFF" });
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    fn enter(&self, step: Step) -> Result<(), RecipeError> {
        if self.stage != Stage::required_for(step) {
            return Err(RecipeError::InvalidState {
                step,
                stage: self.stage,
            });
        }
        Ok(())
    }

    fn fail(&mut self, step: Step, code: Option<i32>, err: RecipeError) -> RecipeError {
        tracing::debug!("{} step failed: {}", step, err);
        self.stage = Stage::Failed { step, code };
        err
    }

    fn run_tool(&mut self, invocation: ToolInvocation) -> Result<(), RecipeError> {
        let step = invocation.step;
        let exit = match self.tool.run(&invocation) {
            Ok(exit) => exit,
            Err(e) => {
                let err = RecipeError::Spawn {
                    step,
                    message: format!("{:#}", e),
                };
                return Err(self.fail(step, None, err));
            }
        };

        match exit.code {
            Some(0) => {
                self.stage = Stage::after(step);
                tracing::debug!("{} step finished", step);
                Ok(())
            }
            Some(code) => Err(self.fail(step, Some(code), RecipeError::step_failed(step, code))),
            None => {
                let err = RecipeError::Spawn {
                    step,
                    message: "terminated by signal".to_string(),
                };
                Err(self.fail(step, None, err))
            }
        }
    }

    /// Resolve requirements, run the build-info generators, then configure.
    pub fn run_configure_step(&mut self) -> Result<(), RecipeError> {
        self.enter(Step::Configure)?;

        // Everything that can fail without the tool fails before it runs.
        if let Err(e) = self.prepare_build_dir() {
            return Err(self.fail(Step::Configure, None, e));
        }

        let invocation =
            CMakeCommands::new(&self.ctx, &self.settings).configure(&self.definitions);
        self.run_tool(invocation)
    }

    fn prepare_build_dir(&self) -> Result<(), RecipeError> {
        ensure_dir(&self.ctx.build_dir)
            .map_err(|e| RecipeError::configuration(format!("{:#}", e)))?;

        let resolved = self.resolver.resolve(&self.requirements)?;
        for generator in &self.ctx.generators {
            let path = generator.write(&self.ctx.build_dir, &self.settings, &resolved)?;
            tracing::debug!("generator {} wrote {}", generator, path.display());
        }
        Ok(())
    }

    pub fn run_build_step(&mut self) -> Result<(), RecipeError> {
        self.enter(Step::Build)?;
        let invocation = CMakeCommands::new(&self.ctx, &self.settings).build();
        self.run_tool(invocation)
    }

    /// Run the test target, forwarding `report_args` verbatim.
    pub fn run_test_step(&mut self, report_args: &[String]) -> Result<(), RecipeError> {
        self.enter(Step::Test)?;
        let invocation = CMakeCommands::new(&self.ctx, &self.settings).test(report_args);
        self.run_tool(invocation)
    }

    /// Copy matching files from the build directory into the output
    /// directory.
    pub fn import_artifacts(&mut self, rules: &[ImportRule]) -> Result<ImportReport, RecipeError> {
        self.enter(Step::Import)?;

        match import_artifacts(&self.ctx.build_dir, &self.ctx.output_dir, rules) {
            Ok(report) => {
                self.stage = Stage::ArtifactsImported;
                tracing::debug!("imported {} artifact(s)", report.total_files());
                Ok(report)
            }
            Err(e) => {
                let err = RecipeError::Import {
                    message: format!("{:#}", e),
                };
                Err(self.fail(Step::Import, None, err))
            }
        }
    }
}

impl<T: BuildTool> fmt::Debug for BuildSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSession")
            .field("settings", &self.settings)
            .field("requirements", &self.requirements)
            .field("definitions", &self.definitions)
            .field("ctx", &self.ctx)
            .field("stage", &self.stage)
            .finish()
    }
}
