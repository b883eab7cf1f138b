//! CMake cache definitions (`-DKEY=VALUE`).

/// The definition that turns on test targets.
pub const BUILD_TESTING: &str = "BUILD_TESTING";

/// Ordered set of CMake definitions.
///
/// Keys keep the position of their first insertion; inserting an existing
/// key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    entries: Vec<(String, String)>,
}

impl Definitions {
    pub fn new() -> Self {
        Definitions::default()
    }

    /// Insert or overwrite a definition.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert every pair in order.
    pub fn extend<I, K, V>(&mut self, defs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in defs {
            self.insert(k, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `-DKEY=VALUE` arguments.
    pub fn to_args(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("-D{}={}", k, v)).collect()
    }
}

/// Parse a `KEY=VALUE` command-line definition.
pub fn parse_definition(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid definition `{}`, expected KEY=VALUE", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid definition `{}`, key is empty", s));
    }
    Ok((key.to_string(), value.to_string()))
}
