//! Store test utilities

use tempfile::TempDir;

use forge_versions::version::store::Store;
use forge_versions::version::types::{Mod, ModVersion, NewModVersion};

pub const NOW: i64 = 1_700_000_000_000;

/// Create a Store backed by a temporary database
pub fn create_test_store() -> (TempDir, Store) {
    create_test_store_with_interval(86_400_000)
}

pub fn create_test_store_with_interval(refresh_interval: i64) -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = Store::new(&db_path, refresh_interval).unwrap();
    (temp_dir, store)
}

pub fn add_mod(store: &Store, mod_id: i64, slug: &str) {
    store
        .upsert_mod(&Mod {
            id: mod_id,
            slug: slug.to_string(),
            name: slug.to_uppercase(),
        })
        .unwrap();
}

/// Add a mod with published versions, returning the version ids in input order
pub fn add_mod_with_versions(
    store: &Store,
    mod_id: i64,
    slug: &str,
    versions: &[&str],
) -> Vec<i64> {
    add_mod(store, mod_id, slug);

    versions
        .iter()
        .map(|v| {
            store
                .add_version(mod_id, &NewModVersion::published(v, NOW - 1))
                .unwrap()
        })
        .collect()
}

pub fn labels(versions: &[ModVersion]) -> Vec<String> {
    versions.iter().map(|v| v.version.to_string()).collect()
}
