//! Build context - tool location, directories and generator choice.

use std::path::{Path, PathBuf};

use crate::builder::generator::Generator;

/// CMake generator used when neither recipe nor config names one.
pub const DEFAULT_CMAKE_GENERATOR: &str = "Unix Makefiles";

/// Directory name under the source dir used when no build dir is given.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Where a run reads from and writes to, and how it drives CMake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// cmake executable
    pub cmake: PathBuf,

    /// Directory holding `CMakeLists.txt`
    pub source_dir: PathBuf,

    /// CMake binary directory
    pub build_dir: PathBuf,

    /// Root that imported artifacts are copied under
    pub output_dir: PathBuf,

    /// CMake generator (`-G`)
    pub cmake_generator: String,

    /// Parallel build jobs
    pub jobs: Option<usize>,

    /// Build-info generators run before configure
    pub generators: Vec<Generator>,
}

impl BuildContext {
    /// Context with `build/<build_type>` as build and output directory.
    pub fn new(
        cmake: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
        build_type: &str,
    ) -> Self {
        let source_dir = source_dir.into();
        let build_dir = source_dir.join(DEFAULT_BUILD_DIR).join(build_type);
        BuildContext {
            cmake: cmake.into(),
            output_dir: build_dir.clone(),
            build_dir,
            source_dir,
            cmake_generator: DEFAULT_CMAKE_GENERATOR.to_string(),
            jobs: None,
            generators: Vec::new(),
        }
    }

    /// Set the build directory. The output directory follows unless it was
    /// set explicitly.
    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if self.output_dir == self.build_dir {
            self.output_dir = dir.clone();
        }
        self.build_dir = dir;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_cmake_generator(mut self, generator: impl Into<String>) -> Self {
        self.cmake_generator = generator.into();
        self
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_generators(mut self, generators: Vec<Generator>) -> Self {
        self.generators = generators;
        self
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether the generator picks the configuration at build time
    /// (Visual Studio, Xcode, Ninja Multi-Config).
    pub fn is_multi_config(&self) -> bool {
        let g = self.cmake_generator.as_str();
        g.starts_with("Visual Studio") || g == "Xcode" || g.ends_with("Multi-Config")
    }

    /// Name of the generated target that runs CTest.
    pub fn test_target(&self) -> &'static str {
        let g = self.cmake_generator.as_str();
        if g.starts_with("Visual Studio") || g == "Xcode" {
            "RUN_TESTS"
        } else {
            "test"
        }
    }
}
