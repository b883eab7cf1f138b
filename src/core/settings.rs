//! Platform settings.
//!
//! Settings identify the environment a recipe is built for: operating
//! system, compiler, build type and architecture. They are supplied by the
//! caller (recipe file, command line) and never inferred from the host.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::builder::errors::RecipeError;

/// The settings keys, in their canonical order.
pub const SETTING_KEYS: [&str; 4] = ["os", "compiler", "build_type", "arch"];

/// Settings as they appear in a recipe or on the command line.
///
/// Every field is optional here; [`SettingsSpec::validate`] turns a complete
/// spec into [`Settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsSpec {
    pub os: Option<String>,
    pub compiler: Option<String>,
    pub build_type: Option<String>,
    pub arch: Option<String>,
}

impl SettingsSpec {
    /// Set a single field by key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), RecipeError> {
        let value = Some(value.into());
        match key {
            "os" => self.os = value,
            "compiler" => self.compiler = value,
            "build_type" => self.build_type = value,
            "arch" => self.arch = value,
            other => {
                return Err(RecipeError::configuration(format!(
                    "unknown setting `{}` (expected one of: {})",
                    other,
                    SETTING_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Parse and apply a `key=value` pair.
    pub fn set_pair(&mut self, pair: &str) -> Result<(), RecipeError> {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            RecipeError::configuration(format!("invalid setting `{}`, expected key=value", pair))
        })?;
        self.set(key.trim(), value.trim())
    }

    /// Overlay another spec on top of this one. Fields set in `other` win.
    pub fn merge(&mut self, other: SettingsSpec) {
        if other.os.is_some() {
            self.os = other.os;
        }
        if other.compiler.is_some() {
            self.compiler = other.compiler;
        }
        if other.build_type.is_some() {
            self.build_type = other.build_type;
        }
        if other.arch.is_some() {
            self.arch = other.arch;
        }
    }

    /// Names of the fields that are unset or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        let fields = [&self.os, &self.compiler, &self.build_type, &self.arch];
        SETTING_KEYS
            .iter()
            .zip(fields)
            .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
            .map(|(k, _)| *k)
            .collect()
    }

    /// Validate into complete settings.
    pub fn validate(self) -> Result<Settings, RecipeError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(RecipeError::configuration(format!(
                "incomplete settings: {} not set",
                missing.join(", ")
            )));
        }

        // All four are present and non-blank past this point.
        let take = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
        Ok(Settings {
            os: take(self.os),
            compiler: take(self.compiler),
            build_type: take(self.build_type),
            arch: take(self.arch),
        })
    }
}

/// Complete, immutable platform settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    os: String,
    compiler: String,
    build_type: String,
    arch: String,
}

impl Settings {
    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// Build type as passed to `CMAKE_BUILD_TYPE` and `--config`.
    pub fn build_type(&self) -> &str {
        &self.build_type
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// `(key, value)` pairs in canonical order.
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("os", &self.os),
            ("compiler", &self.compiler),
            ("build_type", &self.build_type),
            ("arch", &self.arch),
        ]
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.os, self.compiler, self.build_type, self.arch
        )
    }
}
