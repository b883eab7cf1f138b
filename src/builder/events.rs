//! Run event types for JSON output.
//!
//! These events are emitted one per line on stdout when using
//! `--message-format=json`.
//!
//! # Event Types
//!
//! - `run-started`: A recipe run began
//! - `step-started`: A step is about to invoke the build tool
//! - `step-finished`: A step completed (success or failure)
//! - `artifact-imported`: Files were copied by an import rule
//! - `run-finished`: The run completed (success or failure)
//!
//! # Stability
//!
//! New fields may be added, but existing fields should not be removed or renamed.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::session::Step;

/// An event emitted while a recipe runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason")]
pub enum RunEvent {
    /// The run began.
    #[serde(rename = "run-started")]
    RunStarted {
        /// Recipe name
        recipe: String,
        /// Settings summary (e.g. "Linux gcc Release x86_64")
        settings: String,
        /// CMake binary directory
        build_dir: PathBuf,
    },

    /// A step is about to run.
    #[serde(rename = "step-started")]
    StepStarted {
        step: Step,
        /// Rendered command line
        #[serde(skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },

    /// A step completed.
    #[serde(rename = "step-finished")]
    StepFinished {
        step: Step,
        success: bool,
        /// Build tool exit code, if the tool ran and exited
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        duration_ms: u64,
    },

    /// An import rule copied files.
    #[serde(rename = "artifact-imported")]
    ArtifactImported {
        pattern: String,
        /// Destination paths
        filenames: Vec<PathBuf>,
    },

    /// The run completed.
    #[serde(rename = "run-finished")]
    RunFinished {
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
        /// Last stage reached
        stage: String,
    },
}

impl RunEvent {
    pub fn step_started(step: Step, command: Option<String>) -> Self {
        RunEvent::StepStarted { step, command }
    }

    pub fn step_finished(
        step: Step,
        success: bool,
        exit_code: Option<i32>,
        duration_ms: u64,
    ) -> Self {
        RunEvent::StepFinished {
            step,
            success,
            exit_code,
            duration_ms,
        }
    }

    pub fn imported(pattern: impl Into<String>, filenames: Vec<PathBuf>) -> Self {
        RunEvent::ArtifactImported {
            pattern: pattern.into(),
            filenames,
        }
    }

    pub fn finished(success: bool, duration_ms: u64, stage: impl Into<String>) -> Self {
        RunEvent::RunFinished {
            success,
            duration_ms,
            stage: stage.into(),
        }
    }

    /// Convert this event to a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_finished_serialization() {
        let event = RunEvent::step_finished(Step::Test, false, Some(1), 2340);
        let json = event.to_json();
        assert!(json.contains("\"reason\":\"step-finished\""));
        assert!(json.contains("\"step\":\"test\""));
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"exit_code\":1"));
        assert!(json.contains("\"duration_ms\":2340"));
    }

    #[test]
    fn test_step_started_omits_missing_command() {
        let json = RunEvent::step_started(Step::Import, None).to_json();
        assert_eq!(json, r#"{"reason":"step-started","step":"import"}"#);
    }

    #[test]
    fn test_imported_serialization() {
        let event = RunEvent::imported("*.dylib", vec![PathBuf::from("out/lib/foo.dylib")]);
        let value = event.to_value();
        assert_eq!(value["reason"], "artifact-imported");
        assert_eq!(value["pattern"], "*.dylib");
        assert_eq!(value["filenames"][0], "out/lib/foo.dylib");
    }

    #[test]
    fn test_finished_serialization() {
        let value = RunEvent::finished(true, 10, "artifacts imported").to_value();
        assert_eq!(value["reason"], "run-finished");
        assert_eq!(value["success"], true);
        assert_eq!(value["stage"], "artifacts imported");
    }
}
