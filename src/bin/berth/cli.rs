//! CLI definitions using clap.

use std::path::PathBuf;

use berth::builder::definitions::parse_definition;
use berth::util::shell::ColorChoice;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Berth - runs CMake projects through configure, build, test and import
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for status and events
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, build, test and import artifacts for a recipe
    Build(BuildArgs),

    /// Write a starter Berth.toml
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to Berth.toml (default: search upward from the current directory)
    #[arg(long, value_name = "PATH")]
    pub recipe: Option<PathBuf>,

    /// Override a setting (os, compiler, build_type, arch)
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Add a CMake definition
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_definition)]
    pub definitions: Vec<(String, String)>,

    /// CMake binary directory
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Directory imported artifacts are copied under
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// CMake generator (e.g. "Ninja")
    #[arg(short = 'G', long, value_name = "NAME")]
    pub generator: Option<String>,

    /// cmake executable
    #[arg(long, value_name = "PATH", env = "BERTH_CMAKE")]
    pub cmake: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Configure with BUILD_TESTING=OFF
    ///
    /// The test step still runs afterwards. Projects that only define their
    /// `test` target when BUILD_TESTING is on will fail at that step.
    #[arg(long)]
    pub no_testing: bool,

    /// Skip artifact import
    #[arg(long)]
    pub no_imports: bool,

    /// Don't look requirements up in the package cache
    #[arg(long)]
    pub no_resolve: bool,

    /// Print the cmake commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Arguments for the test step, replacing the recipe's
    #[arg(last = true, allow_hyphen_values = true, value_name = "REPORT_ARGS")]
    pub report_args: Vec<String>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Recipe name (defaults to directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
