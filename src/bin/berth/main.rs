//! Berth CLI - runs CMake projects through a fixed recipe

use anyhow::Result;
use berth::builder::errors::RecipeError;
use berth::util::diagnostic::emit;
use berth::util::Shell;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("berth=debug")
    } else {
        EnvFilter::new("berth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    if let Err(e) = run(cli.command, &shell) {
        std::process::exit(report(&e, &shell));
    }
}

fn run(command: Commands, shell: &Shell) -> Result<()> {
    match command {
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Init(args) => commands::init::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print `err` and return the process exit code.
fn report(err: &anyhow::Error, shell: &Shell) -> i32 {
    match err.downcast_ref::<RecipeError>() {
        Some(recipe_err) => {
            if shell.is_json() {
                shell.error(recipe_err);
            } else {
                emit(&recipe_err.to_diagnostic(), shell.use_color());
            }
            recipe_err.exit_code()
        }
        None => {
            if shell.is_json() {
                shell.error(format!("{:#}", err));
            } else {
                eprintln!("error: {:#}", err);
            }
            1
        }
    }
}
