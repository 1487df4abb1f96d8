//! Pull mod versions from the Forge API into the local store

use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{error, info};

use crate::config::FETCH_STAGGER_DELAY_MS;
use crate::version::error::{RegistryError, StoreError};
use crate::version::registry::Registry;
use crate::version::storer::VersionStorer;

/// Fetch and store a single mod's versions
///
/// Returns true if the versions were fetched and saved. A mod the API no
/// longer knows is flagged so later refreshes skip it.
pub async fn sync_mod<S: VersionStorer>(storer: &S, registry: &dyn Registry, mod_id: i64) -> bool {
    match registry.fetch_mod_versions(mod_id).await {
        Ok(versions) => {
            let fetched = versions.len();
            storer
                .replace_versions(mod_id, versions)
                .inspect(|inserted| {
                    info!(
                        "Synced mod {}: {} versions fetched, {} new",
                        mod_id, fetched, inserted
                    )
                })
                .inspect_err(|e| error!("Failed to save versions for mod {}: {}", mod_id, e))
                .is_ok()
        }
        Err(RegistryError::NotFound(_)) => {
            info!(
                "Mod {} not found. Marking as not found to skip future fetches.",
                mod_id
            );
            let _ = storer
                .mark_not_found(mod_id)
                .inspect_err(|e| error!("Failed to mark mod {} as not found: {}", mod_id, e));
            false
        }
        Err(e) => {
            error!("Failed to fetch versions for mod {}: {}", mod_id, e);
            false
        }
    }
}

/// Sync several mods concurrently
///
/// Errors are logged but do not stop processing of other mods. Fetches start
/// staggered to avoid rate limiting. Returns the ids that synced successfully.
pub async fn refresh_mods<S: VersionStorer>(
    storer: &S,
    registry: &dyn Registry,
    mod_ids: Vec<i64>,
) -> Vec<i64> {
    let futures = mod_ids.into_iter().enumerate().map(|(i, mod_id)| {
        let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
        async move {
            sleep(delay).await;
            sync_mod(storer, registry, mod_id).await.then_some(mod_id)
        }
    });

    join_all(futures).await.into_iter().flatten().collect()
}

/// Sync every mod whose versions are older than the refresh interval
pub async fn refresh_stale_mods<S: VersionStorer>(
    storer: &S,
    registry: &dyn Registry,
) -> Result<Vec<i64>, StoreError> {
    let stale = storer.get_mods_needing_refresh()?;
    info!("{} mods need a refresh", stale.len());
    Ok(refresh_mods(storer, registry, stale).await)
}
