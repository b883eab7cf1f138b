//! Requirement lookup.
//!
//! Berth does not resolve or fetch packages itself. A [`Resolver`] maps the
//! pinned requirements of a recipe to packages some other tool has already
//! placed on disk, so the configure step can hand their include and library
//! directories to CMake.

use std::path::{Path, PathBuf};

use crate::builder::errors::RecipeError;
use crate::core::requirement::Requirement;

/// Placeholder for a missing user or channel in cache paths.
const NO_CHANNEL: &str = "_";

/// A requirement matched to an installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequirement {
    pub requirement: Requirement,
    /// Package root, if the resolver located one
    pub root: Option<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub bin_dirs: Vec<PathBuf>,
}

impl ResolvedRequirement {
    /// A requirement with no on-disk location.
    pub fn unlocated(requirement: Requirement) -> Self {
        ResolvedRequirement {
            requirement,
            root: None,
            include_dirs: Vec::new(),
            lib_dirs: Vec::new(),
            bin_dirs: Vec::new(),
        }
    }

    /// Fill the standard subdirectories of `root` that exist.
    pub fn at(requirement: Requirement, root: PathBuf) -> Self {
        let existing = |sub: &str| {
            let dir = root.join(sub);
            if dir.is_dir() {
                vec![dir]
            } else {
                Vec::new()
            }
        };
        ResolvedRequirement {
            requirement,
            include_dirs: existing("include"),
            lib_dirs: existing("lib"),
            bin_dirs: existing("bin"),
            root: Some(root),
        }
    }
}

/// Maps requirements to installed packages.
pub trait Resolver {
    /// Resolve every requirement, in order. Fails if any cannot be found.
    fn resolve(
        &self,
        requirements: &[Requirement],
    ) -> Result<Vec<ResolvedRequirement>, RecipeError>;
}

/// Resolver that locates nothing; every requirement passes through bare.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl Resolver for NullResolver {
    fn resolve(
        &self,
        requirements: &[Requirement],
    ) -> Result<Vec<ResolvedRequirement>, RecipeError> {
        Ok(requirements
            .iter()
            .cloned()
            .map(ResolvedRequirement::unlocated)
            .collect())
    }
}

/// Resolver backed by a local package cache.
///
/// Packages live at `<root>/<name>/<version>/<user>/<channel>/package`, with
/// `_` standing in for a missing user and channel.
#[derive(Debug, Clone)]
pub struct CacheResolver {
    root: PathBuf,
}

impl CacheResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CacheResolver { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the package for `req` is expected.
    pub fn package_dir(&self, req: &Requirement) -> PathBuf {
        let (user, channel) = match req.channel() {
            Some(c) => (c.user.as_str(), c.channel.as_str()),
            None => (NO_CHANNEL, NO_CHANNEL),
        };
        self.root
            .join(req.name())
            .join(req.version())
            .join(user)
            .join(channel)
            .join("package")
    }
}

impl Resolver for CacheResolver {
    fn resolve(
        &self,
        requirements: &[Requirement],
    ) -> Result<Vec<ResolvedRequirement>, RecipeError> {
        let mut resolved = Vec::with_capacity(requirements.len());
        for req in requirements {
            let dir = self.package_dir(req);
            if !dir.is_dir() {
                return Err(RecipeError::configuration(format!(
                    "requirement `{}` is not installed (looked in {})",
                    req,
                    dir.display()
                )));
            }
            tracing::debug!("resolved {} at {}", req, dir.display());
            resolved.push(ResolvedRequirement::at(req.clone(), dir));
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_dir_layout() {
        let resolver = CacheResolver::new("/cache");
        let plain = Requirement::new("catch2", "2.12.2");
        let channeled = Requirement::new("qt", "5.12.9").with_channel("bincrafters", "stable");

        assert_eq!(
            resolver.package_dir(&plain),
            PathBuf::from("/cache/catch2/2.12.2/_/_/package")
        );
        assert_eq!(
            resolver.package_dir(&channeled),
            PathBuf::from("/cache/qt/5.12.9/bincrafters/stable/package")
        );
    }

    #[test]
    fn test_cache_resolver_finds_installed_package() {
        let tmp = TempDir::new().unwrap();
        let resolver = CacheResolver::new(tmp.path());
        let req = Requirement::new("catch2", "2.12.2");

        let pkg = resolver.package_dir(&req);
        std::fs::create_dir_all(pkg.join("include")).unwrap();

        let resolved = resolver.resolve(&[req.clone()]).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].requirement, req);
        assert_eq!(resolved[0].root.as_deref(), Some(pkg.as_path()));
        assert_eq!(resolved[0].include_dirs, vec![pkg.join("include")]);
        assert!(resolved[0].lib_dirs.is_empty());
    }

    #[test]
    fn test_cache_resolver_missing_package() {
        let tmp = TempDir::new().unwrap();
        let resolver = CacheResolver::new(tmp.path());

        let err = resolver
            .resolve(&[Requirement::new("qt", "5.12.9")])
            .unwrap_err();
        assert!(matches!(err, RecipeError::Configuration { .. }));
        assert!(err.to_string().contains("qt/5.12.9"));
    }

    #[test]
    fn test_null_resolver_passes_through() {
        let reqs = vec![
            Requirement::new("catch2", "2.12.2"),
            Requirement::new("qt", "5.12.9"),
        ];
        let resolved = NullResolver.resolve(&reqs).unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.iter().all(|r| r.root.is_none()));
    }
}
