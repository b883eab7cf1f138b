//! Build-info generators.
//!
//! A generator writes requirement information into the build directory in a
//! form the project's build system can consume. The `cmake` generator writes
//! `berthbuildinfo.cmake`, which a `CMakeLists.txt` includes with:
//!
//! ```cmake
//! include(${CMAKE_BINARY_DIR}/berthbuildinfo.cmake)
//! berth_basic_setup()
//! ```

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::builder::errors::RecipeError;
use crate::core::settings::Settings;
use crate::resolver::ResolvedRequirement;
use crate::util::fs::write_string;

/// File written by the CMake generator.
pub const CMAKE_BUILD_INFO: &str = "berthbuildinfo.cmake";

/// Supported generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    CMake,
}

impl FromStr for Generator {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cmake" => Ok(Generator::CMake),
            other => Err(RecipeError::configuration(format!(
                "unknown generator `{}` (supported: cmake)",
                other
            ))),
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generator::CMake => write!(f, "cmake"),
        }
    }
}

impl Generator {
    /// Write this generator's output into `build_dir`.
    pub fn write(
        &self,
        build_dir: &Path,
        settings: &Settings,
        resolved: &[ResolvedRequirement],
    ) -> Result<PathBuf, RecipeError> {
        match self {
            Generator::CMake => {
                let path = build_dir.join(CMAKE_BUILD_INFO);
                write_string(&path, &render_cmake(settings, resolved)).map_err(|e| {
                    RecipeError::configuration(format!("generator `{}` failed: {:#}", self, e))
                })?;
                Ok(path)
            }
        }
    }
}

/// Render `berthbuildinfo.cmake`.
pub fn render_cmake(settings: &Settings, resolved: &[ResolvedRequirement]) -> String {
    let mut out = String::new();
    out.push_str("# Generated by berth. Do not edit.\n\n");

    for (key, value) in settings.pairs() {
        let _ = writeln!(
            out,
            "set(BERTH_SETTINGS_{} \"{}\")",
            key.to_ascii_uppercase(),
            escape(value)
        );
    }
    out.push('\n');

    let names: Vec<_> = resolved.iter().map(|r| r.requirement.name()).collect();
    let _ = writeln!(out, "set(BERTH_REQUIRES {})", names.join(" "));

    let mut all_includes = Vec::new();
    let mut all_libs = Vec::new();

    for r in resolved {
        let ident = r.requirement.cmake_ident();
        out.push('\n');
        let _ = writeln!(
            out,
            "set(BERTH_{}_VERSION \"{}\")",
            ident,
            escape(r.requirement.version())
        );
        if let Some(channel) = r.requirement.channel() {
            let _ = writeln!(
                out,
                "set(BERTH_{}_CHANNEL \"{}\")",
                ident,
                escape(&channel.to_string())
            );
        }
        if let Some(ref root) = r.root {
            let _ = writeln!(out, "set(BERTH_{}_ROOT \"{}\")", ident, cmake_path(root));
        }
        let _ = writeln!(out, "set(BERTH_{}_INCLUDE_DIRS {})", ident, path_list(&r.include_dirs));
        let _ = writeln!(out, "set(BERTH_{}_LIB_DIRS {})", ident, path_list(&r.lib_dirs));
        let _ = writeln!(out, "set(BERTH_{}_BIN_DIRS {})", ident, path_list(&r.bin_dirs));

        all_includes.extend(r.include_dirs.iter().cloned());
        all_libs.extend(r.lib_dirs.iter().cloned());
    }

    out.push('\n');
    let _ = writeln!(out, "set(BERTH_INCLUDE_DIRS {})", path_list(&all_includes));
    let _ = writeln!(out, "set(BERTH_LIB_DIRS {})", path_list(&all_libs));

    out.push_str(
        "\nmacro(berth_basic_setup)\n\
         \x20   include_directories(${BERTH_INCLUDE_DIRS})\n\
         \x20   link_directories(${BERTH_LIB_DIRS})\n\
         endmacro()\n",
    );

    out
}

/// CMake paths always use forward slashes.
fn cmake_path(path: &Path) -> String {
    escape(&path.display().to_string().replace('\\', "/"))
}

fn path_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("\"{}\"", cmake_path(p)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
