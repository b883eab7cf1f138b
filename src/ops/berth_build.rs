//! Implementation of `berth build`.
//!
//! Merges the recipe with config files and command-line overrides into a
//! [`RunPlan`], then drives a [`BuildSession`] through every step, reporting
//! progress through the [`Shell`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;

use crate::builder::cmake::CMakeCommands;
use crate::builder::context::BuildContext;
use crate::builder::definitions::{Definitions, BUILD_TESTING};
use crate::builder::errors::RecipeError;
use crate::builder::events::RunEvent;
use crate::builder::session::{BuildSession, Stage, Step};
use crate::builder::tool::{locate_cmake, BuildTool, CMakeTool, DryRunTool};
use crate::core::recipe::{cmake_truthy, Recipe};
use crate::core::requirement::Requirement;
use crate::core::settings::SettingsSpec;
use crate::ops::imports::{ImportReport, ImportRule};
use crate::resolver::CacheResolver;
use crate::util::config::Config;
use crate::util::shell::{format_duration, Shell, Status};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// `key=value` settings overriding the recipe's `[settings]`
    pub settings: Vec<String>,

    /// Definitions applied after the recipe's, in order
    pub definitions: Vec<(String, String)>,

    /// CMake binary directory (default: `<recipe dir>/build/<build_type>`)
    pub build_dir: Option<PathBuf>,

    /// Root for imported artifacts (default: the build directory)
    pub output_dir: Option<PathBuf>,

    /// CMake generator (`-G`)
    pub generator: Option<String>,

    /// cmake executable
    pub cmake: Option<PathBuf>,

    /// Number of parallel jobs
    pub jobs: Option<usize>,

    /// Configure with `BUILD_TESTING=OFF`
    pub no_testing: bool,

    /// Stop after the test step
    pub no_imports: bool,

    /// Don't look requirements up in the package cache
    pub no_resolve: bool,

    /// Print commands instead of running them
    pub dry_run: bool,

    /// Test report arguments replacing the recipe's
    pub report_args: Option<Vec<String>>,
}

/// Everything a run needs, merged from recipe, config and options.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub recipe_name: String,
    pub settings: SettingsSpec,
    pub requirements: Vec<Requirement>,
    pub context: BuildContext,
    /// Definitions without `BUILD_TESTING`
    pub definitions: Definitions,
    pub testing: bool,
    pub test_args: Vec<String>,
    /// `None` when imports are skipped
    pub imports: Option<Vec<ImportRule>>,
    /// Package cache to resolve against; `None` leaves requirements unlocated
    pub cache_dir: Option<PathBuf>,
}

impl RunPlan {
    /// Merge `recipe`, `config` and `opts`.
    ///
    /// For each knob the command line wins over the recipe, which wins over
    /// config files. Fails before anything runs if the result is unusable.
    pub fn new(
        recipe: &Recipe,
        config: &Config,
        opts: &BuildOptions,
        default_cache_dir: &Path,
    ) -> Result<Self, RecipeError> {
        let mut overlay = SettingsSpec::default();
        for pair in &opts.settings {
            overlay.set_pair(pair)?;
        }
        let mut settings = recipe.settings.clone();
        settings.merge(overlay);
        let validated = settings.clone().validate()?;

        let cmake = resolve_cmake(opts, config)?;

        let source_dir = if recipe.recipe_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            recipe.recipe_dir.clone()
        };

        let jobs = opts.jobs.or(recipe.build.jobs).or(config.build.jobs);
        if jobs == Some(0) {
            return Err(RecipeError::configuration("jobs must be at least 1"));
        }

        let mut context = BuildContext::new(cmake, source_dir, validated.build_type())
            .with_jobs(jobs)
            .with_generators(recipe.generators.clone());
        if let Some(generator) = opts
            .generator
            .as_ref()
            .or(recipe.build.generator.as_ref())
            .or(config.cmake.generator.as_ref())
        {
            context = context.with_cmake_generator(generator.clone());
        }
        if let Some(dir) = &opts.output_dir {
            context = context.with_output_dir(dir.clone());
        }
        if let Some(dir) = &opts.build_dir {
            context = context.with_build_dir(dir.clone());
        }

        let mut definitions = recipe.build.definitions.clone();
        definitions.extend(opts.definitions.iter().cloned());
        let mut testing = recipe.build.testing;
        if let Some(value) = definitions.remove(BUILD_TESTING) {
            testing = cmake_truthy(&value);
        }
        if opts.no_testing {
            testing = false;
        }

        let cache_dir = if opts.no_resolve || opts.dry_run {
            None
        } else {
            Some(
                config
                    .cache
                    .dir
                    .clone()
                    .unwrap_or_else(|| default_cache_dir.to_path_buf()),
            )
        };

        Ok(RunPlan {
            recipe_name: recipe.name().to_string(),
            settings,
            requirements: recipe.requires.clone(),
            context,
            definitions,
            testing,
            test_args: opts
                .report_args
                .clone()
                .unwrap_or_else(|| recipe.test_args.clone()),
            imports: if opts.no_imports {
                None
            } else {
                Some(recipe.imports.clone())
            },
            cache_dir,
        })
    }
}

fn resolve_cmake(opts: &BuildOptions, config: &Config) -> Result<PathBuf, RecipeError> {
    let explicit = opts.cmake.as_deref().or(config.cmake.program.as_deref());
    match locate_cmake(explicit) {
        Some(path) => Ok(path),
        None if opts.dry_run => Ok(PathBuf::from("cmake")),
        None => Err(RecipeError::configuration(
            "cmake was not found on PATH; pass --cmake or set cmake.program in config",
        )),
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct BuildOutcome {
    /// Last stage reached
    pub stage: Stage,

    /// Imported artifacts, unless imports were skipped
    pub imported: Option<ImportReport>,
}

/// Run the recipe with cmake, or with a dry-run tool under `--dry-run`.
pub fn build(
    recipe: &Recipe,
    config: &Config,
    opts: &BuildOptions,
    default_cache_dir: &Path,
    shell: &Shell,
) -> Result<BuildOutcome> {
    let plan = RunPlan::new(recipe, config, opts, default_cache_dir)?;

    if opts.dry_run {
        run(plan, DryRunTool::new(), shell)
    } else {
        // Child output would corrupt the JSON stream.
        run(plan, CMakeTool::new().captured(shell.is_json()), shell)
    }
}

/// Drive `tool` through every step of `plan`.
pub fn run<T: BuildTool>(plan: RunPlan, tool: T, shell: &Shell) -> Result<BuildOutcome> {
    let start = Instant::now();

    let RunPlan {
        recipe_name,
        settings,
        requirements,
        context,
        definitions,
        testing,
        test_args,
        imports,
        cache_dir,
    } = plan;

    let mut session = BuildSession::configure(tool, settings, requirements, context)?;
    if let Some(cache_dir) = cache_dir {
        if !session.requirements().is_empty() {
            shell.status(
                Status::Resolving,
                format!(
                    "{} requirement(s) in {}",
                    session.requirements().len(),
                    cache_dir.display()
                ),
            );
        }
        session = session.with_resolver(CacheResolver::new(cache_dir));
    }
    session.apply_definitions(definitions.iter());
    session.set_build_testing(testing);

    shell.json_event(
        &RunEvent::RunStarted {
            recipe: recipe_name.clone(),
            settings: session.settings().to_string(),
            build_dir: session.context().build_dir().to_path_buf(),
        }
        .to_value(),
    );

    let result = drive(&mut session, &recipe_name, &test_args, imports.as_deref(), shell);
    let elapsed = start.elapsed();
    let stage = session.stage();

    shell.json_event(
        &RunEvent::finished(result.is_ok(), elapsed.as_millis() as u64, stage.to_string())
            .to_value(),
    );

    let imported = result?;
    shell.status(
        Status::Finished,
        format!(
            "`{}` ({}) in {}",
            recipe_name,
            session.settings(),
            format_duration(elapsed)
        ),
    );

    Ok(BuildOutcome { stage, imported })
}

fn drive<T: BuildTool>(
    session: &mut BuildSession<T>,
    recipe_name: &str,
    test_args: &[String],
    imports: Option<&[ImportRule]>,
    shell: &Shell,
) -> Result<Option<ImportReport>, RecipeError> {
    let build_dir = session.context().build_dir().display().to_string();

    let command = CMakeCommands::new(session.context(), session.settings())
        .configure(session.definitions())
        .display_command();
    shell.status(Status::Configuring, format!("{} ({})", recipe_name, build_dir));
    step(session, Step::Configure, Some(command), shell, |s| {
        s.run_configure_step()
    })?;

    let command = CMakeCommands::new(session.context(), session.settings())
        .build()
        .display_command();
    shell.status(
        Status::Building,
        format!("{} [{}]", recipe_name, session.settings().build_type()),
    );
    step(session, Step::Build, Some(command), shell, |s| s.run_build_step())?;

    let command = CMakeCommands::new(session.context(), session.settings())
        .test(test_args)
        .display_command();
    shell.status(Status::Testing, format!("target `{}`", session.context().test_target()));
    step(session, Step::Test, Some(command), shell, |s| s.run_test_step(test_args))?;

    let Some(rules) = imports else {
        shell.verbose(Status::Skipped, "artifact import");
        return Ok(None);
    };

    shell.status(
        Status::Importing,
        format!("{} rule(s) into {}", rules.len(), session.context().output_dir().display()),
    );
    let report = step(session, Step::Import, None, shell, |s| s.import_artifacts(rules))?;

    for imported in &report.rules {
        if imported.files.is_empty() {
            continue;
        }
        for file in &imported.files {
            shell.verbose(Status::Info, format!("imported {}", file.display()));
        }
        shell.json_event(
            &RunEvent::imported(&imported.rule.pattern, imported.files.clone()).to_value(),
        );
    }

    Ok(Some(report))
}

/// Run one step, emitting its start and finish events.
fn step<T, R, F>(
    session: &mut BuildSession<T>,
    step: Step,
    command: Option<String>,
    shell: &Shell,
    f: F,
) -> Result<R, RecipeError>
where
    T: BuildTool,
    F: FnOnce(&mut BuildSession<T>) -> Result<R, RecipeError>,
{
    if let Some(command) = &command {
        shell.verbose(Status::Running, format!("`{}`", command));
    }
    shell.json_event(&RunEvent::step_started(step, command).to_value());

    let start = Instant::now();
    let result = f(session);
    let duration_ms = start.elapsed().as_millis() as u64;

    let exit_code = match (session.stage(), step) {
        (Stage::Failed { code, .. }, _) => code,
        (_, Step::Import) => None,
        _ if result.is_ok() => Some(0),
        _ => None,
    };
    shell.json_event(
        &RunEvent::step_finished(step, result.is_ok(), exit_code, duration_ms).to_value(),
    );

    result
}
