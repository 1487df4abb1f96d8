//! Registry trait for fetching mod versions from a remote Forge instance

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::NewModVersion;

/// Trait for fetching mod versions from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches all published versions of a mod
    ///
    /// # Arguments
    /// * `mod_id` - The numeric id of the mod on the Forge
    ///
    /// # Returns
    /// * `Ok(Vec<NewModVersion>)` - Versions ordered from oldest to newest
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_mod_versions(&self, mod_id: i64) -> Result<Vec<NewModVersion>, RegistryError>;
}
