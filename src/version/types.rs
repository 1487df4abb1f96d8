//! Records shared by the store, the resolver and the registry client

use crate::version::semver::SemanticVersion;

/// A mod listed on the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mod {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

/// One published version of a mod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModVersion {
    pub id: i64,
    pub mod_id: i64,
    pub version: SemanticVersion,
    /// Constraint on the game platform version this release supports (e.g. "~3.9.0")
    pub platform_constraint: Option<String>,
    pub disabled: bool,
    /// Publication time in milliseconds since UNIX epoch; `None` means unpublished
    pub published_at: Option<i64>,
}

impl ModVersion {
    /// A version is visible to the public once it is published and not disabled.
    pub fn is_publicly_visible(&self, now_ms: i64) -> bool {
        !self.disabled && self.published_at.is_some_and(|published| published <= now_ms)
    }
}

/// Input for inserting a mod version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewModVersion {
    pub version: String,
    pub platform_constraint: Option<String>,
    pub published_at: Option<i64>,
}

impl NewModVersion {
    pub fn published(version: &str, published_at: i64) -> Self {
        Self {
            version: version.to_string(),
            platform_constraint: None,
            published_at: Some(published_at),
        }
    }

    pub fn with_platform_constraint(mut self, constraint: &str) -> Self {
        self.platform_constraint = Some(constraint.to_string());
        self
    }
}

/// A mod version requiring a version of another mod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub id: i64,
    pub mod_version_id: i64,
    pub dependent_mod_id: i64,
    pub constraint: String,
}

/// The versions a dependency currently resolves to, latest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub dependency: Dependency,
    pub versions: Vec<ModVersion>,
}

impl ResolvedDependency {
    pub fn latest(&self) -> Option<&ModVersion> {
        self.versions.first()
    }

    pub fn is_satisfied(&self) -> bool {
        !self.versions.is_empty()
    }
}
