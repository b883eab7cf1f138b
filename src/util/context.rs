//! Global context for Berth operations.
//!
//! Provides centralized access to the working directory and the locations
//! of configuration and cached packages.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;

use crate::builder::errors::RecipeError;
use crate::core::recipe::RECIPE_FILE;

/// Name of the per-user and per-project Berth directory.
pub const BERTH_DIR: &str = ".berth";

/// Global context containing paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Berth data (~/.berth/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(BERTH_DIR))
            .unwrap_or_else(|| PathBuf::from(BERTH_DIR));

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Override the Berth home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the Berth home directory (~/.berth/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project configuration file path for a recipe directory.
    pub fn project_config_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(BERTH_DIR).join("config.toml")
    }

    /// Default root of the installed package cache.
    pub fn default_cache_dir(&self) -> PathBuf {
        self.home.join("data")
    }

    /// Find `Berth.toml` starting from cwd and searching upward.
    pub fn find_recipe(&self) -> Result<PathBuf> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(RECIPE_FILE);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(RecipeError::NoRecipe {
                    dir: self.cwd.clone(),
                }
                .into());
            }
        }
    }
}
