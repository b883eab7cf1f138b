//! Berth - runs CMake projects through a fixed recipe
//!
//! This crate provides the core library functionality for Berth: recipe
//! parsing, settings and requirement validation, and the build session that
//! walks an external build tool through configure, build, test and artifact
//! import.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for Berth unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted build tool and recipe fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildContext, BuildSession, RecipeError, Stage, Step};
pub use crate::core::{Recipe, Requirement, Settings, SettingsSpec};
pub use util::context::GlobalContext;
