//! Artifact import.
//!
//! After a successful build and test, shared libraries are copied from the
//! build tree into conventional output directories: Windows DLLs next to
//! executables in `bin`, macOS dylibs into `lib`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::util::fs::ensure_dir;

/// Copy files named like `pattern` from `<source>/<src>` into
/// `<dest>/<dst>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportRule {
    /// Glob matched against file names
    pub pattern: String,
    /// Destination subdirectory
    pub dst: String,
    /// Source subdirectory
    #[serde(default)]
    pub src: String,
}

impl ImportRule {
    pub fn new(
        pattern: impl Into<String>,
        dst: impl Into<String>,
        src: impl Into<String>,
    ) -> Self {
        ImportRule {
            pattern: pattern.into(),
            dst: dst.into(),
            src: src.into(),
        }
    }
}

/// `*.dll` into `bin`, `*.dylib` into `lib`, both read from `bin`.
pub fn default_import_rules() -> Vec<ImportRule> {
    vec![
        ImportRule::new("*.dll", "bin", "bin"),
        ImportRule::new("*.dylib", "lib", "bin"),
    ]
}

/// Files copied for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedRule {
    pub rule: ImportRule,
    /// Destination paths, sorted
    pub files: Vec<PathBuf>,
}

/// Outcome of an import run, one entry per rule in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub rules: Vec<ImportedRule>,
}

impl ImportReport {
    pub fn total_files(&self) -> usize {
        self.rules.iter().map(|r| r.files.len()).sum()
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.rules
            .iter()
            .flat_map(|r| r.files.iter().map(PathBuf::as_path))
    }
}

/// Apply `rules` in order.
///
/// Paths below each rule's source directory are kept. A rule that matches
/// nothing, or whose source directory does not exist, copies nothing and is
/// not an error.
pub fn import_artifacts(
    source_root: &Path,
    dest_root: &Path,
    rules: &[ImportRule],
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for rule in rules {
        let pattern = Pattern::new(&rule.pattern)
            .with_context(|| format!("invalid import pattern `{}`", rule.pattern))?;
        let src_dir = source_root.join(&rule.src);
        let dst_dir = dest_root.join(&rule.dst);

        let mut files = Vec::new();
        if src_dir.is_dir() {
            // Earlier copies under a nested destination are not sources.
            let walk = WalkDir::new(&src_dir)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || e.path() != dst_dir);
            for entry in walk {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", src_dir.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if !pattern.matches_with(&name, match_options()) {
                    continue;
                }

                let rel = entry.path().strip_prefix(&src_dir).unwrap_or(entry.path());
                let dst = dst_dir.join(rel);
                if dst == entry.path() {
                    // Importing a directory onto itself.
                    files.push(dst);
                    continue;
                }
                if let Some(parent) = dst.parent() {
                    ensure_dir(parent)?;
                }
                std::fs::copy(entry.path(), &dst).with_context(|| {
                    format!("failed to copy {} to {}", entry.path().display(), dst.display())
                })?;
                tracing::debug!("imported {}", dst.display());
                files.push(dst);
            }
        }

        if files.is_empty() {
            tracing::debug!(
                "import `{}` from {} matched nothing",
                rule.pattern,
                src_dir.display()
            );
        }

        report.rules.push(ImportedRule {
            rule: rule.clone(),
            files,
        });
    }

    Ok(report)
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: !cfg!(windows),
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_only_matching_rule_copies() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("build");
        let out = tmp.path().join("out");
        fs::create_dir_all(src.join("bin")).unwrap();
        fs::write(src.join("bin/foo.dylib"), b"dylib").unwrap();

        let report = import_artifacts(&src, &out, &default_import_rules()).unwrap();

        assert_eq!(report.rules.len(), 2);
        assert!(report.rules[0].files.is_empty());
        assert_eq!(report.rules[1].files, vec![out.join("lib/foo.dylib")]);
        assert_eq!(fs::read(out.join("lib/foo.dylib")).unwrap(), b"dylib");
        assert!(!out.join("bin").exists());
    }

    #[test]
    fn test_missing_source_dir_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let report = import_artifacts(
            &tmp.path().join("nope"),
            &tmp.path().join("out"),
            &default_import_rules(),
        )
        .unwrap();
        assert_eq!(report.total_files(), 0);
    }

    #[test]
    fn test_nested_paths_are_kept() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("build");
        fs::create_dir_all(src.join("bin/plugins/platforms")).unwrap();
        fs::write(src.join("bin/a.dll"), b"a").unwrap();
        fs::write(src.join("bin/plugins/platforms/qwindows.dll"), b"q").unwrap();
        fs::write(src.join("bin/a.pdb"), b"pdb").unwrap();

        let out = tmp.path().join("out");
        let report =
            import_artifacts(&src, &out, &[ImportRule::new("*.dll", "bin", "bin")]).unwrap();

        assert_eq!(report.total_files(), 2);
        assert!(out.join("bin/a.dll").exists());
        assert!(out.join("bin/plugins/platforms/qwindows.dll").exists());
        assert!(!out.join("bin/a.pdb").exists());
    }

    #[test]
    fn test_import_onto_itself() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("bin")).unwrap();
        fs::write(tmp.path().join("bin/x.dll"), b"x").unwrap();

        let report = import_artifacts(
            tmp.path(),
            tmp.path(),
            &[ImportRule::new("*.dll", "bin", "bin")],
        )
        .unwrap();
        assert_eq!(report.total_files(), 1);
        assert_eq!(fs::read(tmp.path().join("bin/x.dll")).unwrap(), b"x");
    }

    #[test]
    fn test_reimport_into_nested_destination() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("bin")).unwrap();
        fs::write(tmp.path().join("bin/foo.dylib"), b"dylib").unwrap();
        let rules = [ImportRule::new("*.dylib", "lib", "")];

        let first = import_artifacts(tmp.path(), tmp.path(), &rules).unwrap();
        assert_eq!(first.rules[0].files, vec![tmp.path().join("lib/bin/foo.dylib")]);

        let second = import_artifacts(tmp.path(), tmp.path(), &rules).unwrap();
        assert_eq!(second.rules[0].files, first.rules[0].files);
        assert!(!tmp.path().join("lib/lib").exists());
    }

    #[test]
    fn test_invalid_pattern() {
        let tmp = TempDir::new().unwrap();
        let err = import_artifacts(
            tmp.path(),
            tmp.path(),
            &[ImportRule::new("[", "bin", "bin")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid import pattern"));
    }

    #[test]
    fn test_rule_deserializes_without_src() {
        let rule: ImportRule = toml::from_str("pattern = \"*.so\"\ndst = \"lib\"\n").unwrap();
        assert_eq!(rule.src, "");
    }
}
