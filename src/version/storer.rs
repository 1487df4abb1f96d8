//! Storage seam used by the resolver and the sync routines

#[cfg(test)]
use mockall::automock;

use crate::version::error::StoreError;
use crate::version::semver::SemanticVersion;
use crate::version::types::{Dependency, ModVersion, NewModVersion};

/// Trait for storing and retrieving mod version information
#[cfg_attr(test, automock)]
pub trait VersionStorer: Send + Sync + 'static {
    /// Get a single mod version by id
    fn get_mod_version(&self, mod_version_id: i64) -> Result<Option<ModVersion>, StoreError>;

    /// Get every version of a mod, latest first
    fn get_mod_versions(&self, mod_id: i64) -> Result<Vec<ModVersion>, StoreError>;

    /// Get the dependencies declared by a mod version
    fn get_dependencies(&self, mod_version_id: i64) -> Result<Vec<Dependency>, StoreError>;

    /// Replace the set of versions a dependency resolves to
    fn replace_resolved_dependencies(
        &self,
        dependency_id: i64,
        resolved_version_ids: Vec<i64>,
    ) -> Result<(), StoreError>;

    /// Get all known game platform versions
    fn get_platform_versions(&self) -> Result<Vec<SemanticVersion>, StoreError>;

    /// Merge fetched versions into a mod, returning how many were new
    fn replace_versions(
        &self,
        mod_id: i64,
        versions: Vec<NewModVersion>,
    ) -> Result<usize, StoreError>;

    /// Get mods whose versions have not been synced within the refresh interval
    fn get_mods_needing_refresh(&self) -> Result<Vec<i64>, StoreError>;

    /// Mark a mod as missing upstream so it is skipped by future refreshes
    fn mark_not_found(&self, mod_id: i64) -> Result<(), StoreError>;
}
