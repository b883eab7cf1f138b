//! CMake command lines for each step.

use crate::builder::context::BuildContext;
use crate::builder::definitions::Definitions;
use crate::builder::session::Step;
use crate::builder::tool::ToolInvocation;
use crate::core::settings::Settings;

/// Builds the cmake invocations for one session.
pub struct CMakeCommands<'a> {
    ctx: &'a BuildContext,
    settings: &'a Settings,
}

impl<'a> CMakeCommands<'a> {
    pub fn new(ctx: &'a BuildContext, settings: &'a Settings) -> Self {
        CMakeCommands { ctx, settings }
    }

    fn invocation(&self, step: Step, args: Vec<String>) -> ToolInvocation {
        ToolInvocation {
            step,
            program: self.ctx.cmake.clone(),
            args,
            cwd: self.ctx.build_dir.clone(),
        }
    }

    /// `cmake -S <src> -B <build> -G <gen> [-DCMAKE_BUILD_TYPE=..] -D...`
    pub fn configure(&self, definitions: &Definitions) -> ToolInvocation {
        let mut args = vec![
            "-S".to_string(),
            self.ctx.source_dir.display().to_string(),
            "-B".to_string(),
            self.ctx.build_dir.display().to_string(),
            "-G".to_string(),
            self.ctx.cmake_generator.clone(),
        ];

        // Multi-config generators pick the configuration at build time.
        if !self.ctx.is_multi_config() {
            args.push(format!("-DCMAKE_BUILD_TYPE={}", self.settings.build_type()));
        }

        args.extend(definitions.to_args());
        self.invocation(Step::Configure, args)
    }

    fn build_args(&self) -> Vec<String> {
        vec![
            "--build".to_string(),
            self.ctx.build_dir.display().to_string(),
            "--config".to_string(),
            self.settings.build_type().to_string(),
        ]
    }

    /// `cmake --build <build> --config <type> [--parallel N]`
    pub fn build(&self) -> ToolInvocation {
        let mut args = self.build_args();
        if let Some(jobs) = self.ctx.jobs {
            args.push("--parallel".to_string());
            args.push(jobs.to_string());
        }
        self.invocation(Step::Build, args)
    }

    /// `cmake --build <build> --config <type> --target test <report args>`
    pub fn test(&self, report_args: &[String]) -> ToolInvocation {
        let mut args = self.build_args();
        args.push("--target".to_string());
        args.push(self.ctx.test_target().to_string());
        args.extend(report_args.iter().cloned());
        self.invocation(Step::Test, args)
    }
}
