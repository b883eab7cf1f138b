//! Core data structures for Berth.
//!
//! This module contains the inputs of a run:
//! - Settings (os, compiler, build type, arch)
//! - Requirement references
//! - The `Berth.toml` recipe

pub mod recipe;
pub mod requirement;
pub mod settings;

pub use recipe::{Recipe, RECIPE_FILE};
pub use requirement::Requirement;
pub use settings::{Settings, SettingsSpec};
