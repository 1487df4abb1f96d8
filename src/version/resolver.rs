//! Dependency resolution and platform compatibility
//!
//! A dependency names another mod and a version constraint. Resolving it
//! yields every publicly visible version of that mod the constraint accepts,
//! latest first. Platform compatibility works the same way against the list
//! of game platform versions.

use tracing::{debug, warn};

use crate::version::constraint::VersionConstraint;
use crate::version::entity::{SortDirection, sort_versions};
use crate::version::error::StoreError;
use crate::version::semver::{SemanticVersion, compare};
use crate::version::storer::VersionStorer;
use crate::version::types::{Dependency, ModVersion, ResolvedDependency};

/// Versions of the dependent mod satisfying the dependency, latest first.
///
/// An unparseable constraint resolves to nothing.
pub fn resolve_dependency<S: VersionStorer>(
    storer: &S,
    dependency: &Dependency,
    now_ms: i64,
) -> Result<Vec<ModVersion>, StoreError> {
    let constraint = match VersionConstraint::parse(&dependency.constraint) {
        Ok(constraint) => constraint,
        Err(e) => {
            warn!(
                "Dependency {} has an invalid constraint {:?}: {}",
                dependency.id, dependency.constraint, e
            );
            return Ok(Vec::new());
        }
    };

    let mut matching: Vec<ModVersion> = storer
        .get_mod_versions(dependency.dependent_mod_id)?
        .into_iter()
        .filter(|v| v.is_publicly_visible(now_ms) && constraint.satisfies(&v.version))
        .collect();

    sort_versions(&mut matching, SortDirection::LatestFirst);

    debug!(
        "Dependency {} ({} {}) resolved to {} versions",
        dependency.id,
        dependency.dependent_mod_id,
        constraint,
        matching.len()
    );
    Ok(matching)
}

/// Resolve every dependency of a mod version and persist the result.
pub fn resolve_mod_version<S: VersionStorer>(
    storer: &S,
    mod_version_id: i64,
    now_ms: i64,
) -> Result<Vec<ResolvedDependency>, StoreError> {
    if storer.get_mod_version(mod_version_id)?.is_none() {
        return Err(StoreError::ModVersionNotFound(mod_version_id));
    }

    storer
        .get_dependencies(mod_version_id)?
        .into_iter()
        .map(|dependency| {
            let versions = resolve_dependency(storer, &dependency, now_ms)?;
            storer.replace_resolved_dependencies(
                dependency.id,
                versions.iter().map(|v| v.id).collect(),
            )?;
            Ok(ResolvedDependency {
                dependency,
                versions,
            })
        })
        .collect()
}

/// Platform versions the mod version declares support for, latest first.
pub fn compatible_platform_versions<S: VersionStorer>(
    storer: &S,
    mod_version: &ModVersion,
) -> Result<Vec<SemanticVersion>, StoreError> {
    let Some(raw) = mod_version.platform_constraint.as_deref() else {
        return Ok(Vec::new());
    };

    let constraint = match VersionConstraint::parse(raw) {
        Ok(constraint) => constraint,
        Err(e) => {
            warn!(
                "Mod version {} has an invalid platform constraint {:?}: {}",
                mod_version.id, raw, e
            );
            return Ok(Vec::new());
        }
    };

    let mut versions: Vec<SemanticVersion> = storer
        .get_platform_versions()?
        .into_iter()
        .filter(|v| constraint.satisfies(v))
        .collect();
    versions.sort_by(|a, b| compare(b, a));
    Ok(versions)
}

/// The latest visible version of a mod that supports the given platform version.
pub fn latest_compatible_version<S: VersionStorer>(
    storer: &S,
    mod_id: i64,
    platform_version: &SemanticVersion,
    now_ms: i64,
) -> Result<Option<ModVersion>, StoreError> {
    let mut candidates: Vec<ModVersion> = storer
        .get_mod_versions(mod_id)?
        .into_iter()
        .filter(|v| v.is_publicly_visible(now_ms))
        .filter(|v| {
            v.platform_constraint
                .as_deref()
                .and_then(|raw| VersionConstraint::parse(raw).ok())
                .is_some_and(|constraint| constraint.satisfies(platform_version))
        })
        .collect();

    sort_versions(&mut candidates, SortDirection::LatestFirst);
    Ok(candidates.into_iter().next())
}
