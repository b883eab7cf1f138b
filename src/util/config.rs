//! Configuration file support for Berth.
//!
//! Berth reads two configuration files:
//! - Global: `~/.berth/config.toml` - User-wide defaults
//! - Project: `.berth/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Values in the recipe
//! and on the command line take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Berth configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CMake settings
    pub cmake: CMakeConfig,

    /// Package cache settings
    pub cache: CacheConfig,

    /// Build settings
    pub build: BuildConfig,
}

/// CMake-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CMakeConfig {
    /// Path to the cmake executable (default: found on PATH)
    pub program: Option<PathBuf>,

    /// Default CMake generator (e.g. "Ninja")
    pub generator: Option<String>,
}

/// Package cache configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root of the installed package cache
    pub dir: Option<PathBuf>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default number of parallel jobs (None = let the generator decide)
    pub jobs: Option<usize>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.cmake.program.is_some() {
            self.cmake.program = other.cmake.program;
        }
        if other.cmake.generator.is_some() {
            self.cmake.generator = other.cmake.generator;
        }
        if other.cache.dir.is_some() {
            self.cache.dir = other.cache.dir;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.berth/config.toml)
/// 2. Global config (~/.berth/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.cmake.program.is_none());
        assert!(config.cmake.generator.is_none());
        assert!(config.cache.dir.is_none());
        assert!(config.build.jobs.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[cmake]
program = "/opt/cmake/bin/cmake"
generator = "Ninja"

[cache]
dir = "/var/cache/berth"

[build]
jobs = 8
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.cmake.program, Some(PathBuf::from("/opt/cmake/bin/cmake")));
        assert_eq!(config.cmake.generator.as_deref(), Some("Ninja"));
        assert_eq!(config.cache.dir, Some(PathBuf::from("/var/cache/berth")));
        assert_eq!(config.build.jobs, Some(8));
    }

    #[test]
    fn test_config_load_rejects_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[build]\njobs = \"many\"\n").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.cmake.generator = Some("Unix Makefiles".to_string());
        base.build.jobs = Some(4);

        let mut override_cfg = Config::default();
        override_cfg.cmake.generator = Some("Ninja".to_string());

        base.merge(override_cfg);

        assert_eq!(base.cmake.generator.as_deref(), Some("Ninja"));
        assert_eq!(base.build.jobs, Some(4)); // Not overridden
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[cmake]
generator = "Unix Makefiles"

[build]
jobs = 2
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[cmake]
generator = "Ninja"
"#,
        )
        .unwrap();

        let config = load_config(&global_path, &project_path);
        assert_eq!(config.cmake.generator.as_deref(), Some("Ninja"));
        assert_eq!(config.build.jobs, Some(2));
    }

    #[test]
    fn test_load_config_missing_files() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("a.toml"), &tmp.path().join("b.toml"));
        assert_eq!(config, Config::default());
    }
}
