//! `berth build` command

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::BuildArgs;
use berth::core::recipe::{Recipe, RECIPE_FILE};
use berth::ops::berth_build::{build, BuildOptions};
use berth::util::config::load_config;
use berth::util::fs::absolutize;
use berth::util::shell::{Shell, Status};
use berth::util::GlobalContext;

/// Convert parsed arguments into build options, resolving paths against
/// `cwd`.
pub fn build_options(args: BuildArgs, cwd: &Path) -> BuildOptions {
    // A bare program name is looked up on PATH by the OS.
    let cmake = args.cmake.map(|p| {
        if p.components().count() > 1 {
            absolutize(cwd, &p)
        } else {
            p
        }
    });

    BuildOptions {
        settings: args.settings,
        definitions: args.definitions,
        build_dir: args.build_dir.map(|p| absolutize(cwd, &p)),
        output_dir: args.output_dir.map(|p| absolutize(cwd, &p)),
        generator: args.generator,
        cmake,
        jobs: args.jobs,
        no_testing: args.no_testing,
        no_imports: args.no_imports,
        no_resolve: args.no_resolve,
        dry_run: args.dry_run,
        report_args: if args.report_args.is_empty() {
            None
        } else {
            Some(args.report_args)
        },
    }
}

/// The recipe named by `--recipe`, which may be a directory.
fn recipe_path(explicit: Option<&Path>, ctx: &GlobalContext) -> Result<PathBuf> {
    match explicit {
        Some(path) => {
            let path = absolutize(ctx.cwd(), path);
            if path.is_dir() {
                Ok(path.join(RECIPE_FILE))
            } else {
                Ok(path)
            }
        }
        None => ctx.find_recipe(),
    }
}

pub fn execute(args: BuildArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let recipe_path = recipe_path(args.recipe.as_deref(), &ctx)?;
    let recipe = Recipe::load(&recipe_path)?;

    // Load configuration (global + project)
    let config = load_config(
        &ctx.config_path(),
        &ctx.project_config_path(&recipe.recipe_dir),
    );

    let opts = build_options(args, ctx.cwd());
    let outcome = build(&recipe, &config, &opts, &ctx.default_cache_dir(), shell)?;

    if let Some(report) = outcome.imported {
        if report.total_files() > 0 {
            shell.status(
                Status::Info,
                format!("imported {} artifact(s)", report.total_files()),
            );
        }
    }

    Ok(())
}
