//! Test fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use crate::core::recipe::RECIPE_FILE;
use crate::core::settings::SettingsSpec;

/// Linux / gcc / Release / x86_64.
pub fn linux_release_spec() -> SettingsSpec {
    SettingsSpec {
        os: Some("Linux".into()),
        compiler: Some("gcc".into()),
        build_type: Some("Release".into()),
        arch: Some("x86_64".into()),
    }
}

/// Recipe for a CMake project requiring catch2 and qt, with no generators
/// so nothing needs to be installed.
pub const CPPMCTS_RECIPE: &str = r#"requires = ["catch2/2.12.2", "qt/5.12.9@bincrafters/stable"]

[recipe]
name = "cppmcts"
version = "0.1.0"

[settings]
os = "Linux"
compiler = "gcc"
build_type = "Release"
arch = "x86_64"

[build.definitions]
CMAKE_EXPORT_COMPILE_COMMANDS = "TRUE"
"#;

/// Write a recipe and an empty `CMakeLists.txt` into `dir`. Returns the
/// recipe path.
pub fn write_project(dir: &Path, recipe: &str) -> PathBuf {
    std::fs::create_dir_all(dir).expect("failed to create project dir");
    let path = dir.join(RECIPE_FILE);
    std::fs::write(&path, recipe).expect("failed to write recipe");
    std::fs::write(
        dir.join("CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.10)\nproject(cppmcts CXX)\n",
    )
    .expect("failed to write CMakeLists.txt");
    path
}
