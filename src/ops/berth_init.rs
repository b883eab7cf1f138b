//! Implementation of `berth init`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::recipe::RECIPE_FILE;

/// Options for creating a recipe.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Recipe name
    pub name: String,
}

/// Host settings used to pre-fill `[settings]`.
fn host_settings() -> (&'static str, &'static str, &'static str) {
    let os = match std::env::consts::OS {
        "windows" => "Windows",
        "macos" => "Macos",
        "freebsd" => "FreeBSD",
        _ => "Linux",
    };
    let compiler = match os {
        "Windows" => "Visual Studio",
        "Macos" => "apple-clang",
        _ => "gcc",
    };
    let arch = match std::env::consts::ARCH {
        "aarch64" => "armv8",
        "x86" => "x86",
        _ => "x86_64",
    };
    (os, compiler, arch)
}

/// Generate a starter recipe.
pub fn generate_recipe(name: &str) -> String {
    let (os, compiler, arch) = host_settings();
    format!(
        r#"# requires = ["catch2/2.12.2"]
generators = ["cmake"]

[recipe]
name = "{name}"
version = "0.1.0"

[settings]
os = "{os}"
compiler = "{compiler}"
build_type = "Release"
arch = "{arch}"

[build]
testing = true

[build.definitions]
CMAKE_EXPORT_COMPILE_COMMANDS = "TRUE"

[test]
args = ["--", "ARGS=-T Test"]

[[imports]]
pattern = "*.dll"
dst = "bin"
src = "bin"

[[imports]]
pattern = "*.dylib"
dst = "lib"
src = "bin"
"#
    )
}

/// Write `Berth.toml` into `path`, creating the directory if needed.
pub fn init(path: &Path, opts: &InitOptions) -> Result<PathBuf> {
    let recipe_path = path.join(RECIPE_FILE);
    if recipe_path.exists() {
        bail!("`{}` already exists in `{}`", RECIPE_FILE, path.display());
    }

    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))?;
    fs::write(&recipe_path, generate_recipe(&opts.name))
        .with_context(|| format!("failed to write {}", recipe_path.display()))?;

    Ok(recipe_path)
}

/// Derive a recipe name from a directory.
pub fn default_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "recipe".to_string())
}
