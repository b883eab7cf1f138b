//! Build orchestration.
//!
//! This module drives an external build tool (CMake) through the steps of a
//! recipe run.

pub mod cmake;
pub mod context;
pub mod definitions;
pub mod errors;
pub mod events;
pub mod generator;
pub mod session;
pub mod tool;

pub use context::BuildContext;
pub use definitions::Definitions;
pub use errors::RecipeError;
pub use events::RunEvent;
pub use generator::Generator;
pub use session::{BuildSession, Stage, Step};
pub use tool::{BuildTool, CMakeTool, DryRunTool, ToolExit, ToolInvocation};
