//! `berth init` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::InitArgs;
use berth::ops::berth_init::{default_name, init, InitOptions};
use berth::util::shell::{Shell, Status};

pub fn execute(args: InitArgs, shell: &Shell) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    let dir = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };

    let name = args.name.unwrap_or_else(|| default_name(&dir));
    let recipe_path = init(&dir, &InitOptions { name: name.clone() })?;

    shell.status(Status::Created, format!("recipe `{}` at {}", name, recipe_path.display()));
    if !dir.join("CMakeLists.txt").exists() {
        shell.warn(format!("no CMakeLists.txt in {}", dir.display()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// Helper to parse InitArgs from command-line strings.
    fn parse_init_args(args: &[&str]) -> InitArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            init: InitArgs,
        }
        let cli = TestCli::parse_from(args);
        cli.init
    }

    #[test]
    fn test_init_args_defaults() {
        let args = parse_init_args(&["test"]);
        assert!(args.name.is_none());
        assert!(args.path.is_none());
    }

    #[test]
    fn test_init_with_name_and_path() {
        let args = parse_init_args(&["test", "--name", "cppmcts", "proj"]);
        assert_eq!(args.name, Some("cppmcts".to_string()));
        assert_eq!(args.path, Some(PathBuf::from("proj")));
    }
}
