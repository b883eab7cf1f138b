//! High-level operations.
//!
//! This module contains the implementation of Berth commands.

pub mod berth_build;
pub mod berth_init;
pub mod imports;

pub use berth_build::{build, BuildOptions, BuildOutcome, RunPlan};
pub use berth_init::{init, InitOptions};
pub use imports::{import_artifacts, ImportReport, ImportRule};
