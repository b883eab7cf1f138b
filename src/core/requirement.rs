//! Package requirements.
//!
//! A requirement pins an external package to an exact version, optionally
//! from a `user/channel` distribution channel. Requirements are written in
//! reference form:
//!
//! ```text
//! catch2/2.12.2
//! qt/5.12.9@bincrafters/stable
//! ```
//!
//! Resolving them to files on disk is the job of a [`crate::resolver::Resolver`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::builder::errors::RecipeError;

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^([A-Za-z0-9_][A-Za-z0-9_.+-]*)/([A-Za-z0-9_.+-]+)",
        r"(?:@([A-Za-z0-9_.+-]+)/([A-Za-z0-9_.+-]+))?$",
    ))
    .expect("requirement reference regex is valid")
});

/// Distribution channel of a requirement (`user/channel`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    pub user: String,
    pub channel: String,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.channel)
    }
}

/// A pinned package requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    name: String,
    version: String,
    channel: Option<Channel>,
}

impl Requirement {
    /// Create a requirement without a channel.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Requirement {
            name: name.into(),
            version: version.into(),
            channel: None,
        }
    }

    /// Attach a `user/channel`.
    pub fn with_channel(mut self, user: impl Into<String>, channel: impl Into<String>) -> Self {
        self.channel = Some(Channel {
            user: user.into(),
            channel: channel.into(),
        });
        self
    }

    /// Parse a `name/version[@user/channel]` reference.
    pub fn parse(reference: &str) -> Result<Self, RecipeError> {
        let reference = reference.trim();
        let caps = REFERENCE_RE.captures(reference).ok_or_else(|| {
            RecipeError::configuration(format!(
                "invalid requirement `{}`, expected name/version or name/version@user/channel",
                reference
            ))
        })?;

        let mut req = Requirement::new(&caps[1], &caps[2]);
        if let (Some(user), Some(channel)) = (caps.get(3), caps.get(4)) {
            req = req.with_channel(user.as_str(), channel.as_str());
        }
        Ok(req)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }

    /// The version as semver, when the pin is a valid semver version.
    pub fn semver(&self) -> Option<Version> {
        Version::parse(&self.version).ok()
    }

    /// Upper-cased identifier used in generated CMake variables.
    pub fn cmake_ident(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let Some(ref channel) = self.channel {
            write!(f, "@{}", channel)?;
        }
        Ok(())
    }
}

impl FromStr for Requirement {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Requirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Requirement::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Check a requirement list: names and versions well-formed, no package
/// named twice.
pub fn validate_requirements(requirements: &[Requirement]) -> Result<(), RecipeError> {
    let mut seen = HashSet::new();
    for req in requirements {
        // Requirements built with `new` bypass the reference parser.
        Requirement::parse(&req.to_string())?;
        if !seen.insert(req.name()) {
            return Err(RecipeError::configuration(format!(
                "package `{}` is required more than once",
                req.name()
            )));
        }
    }
    Ok(())
}
