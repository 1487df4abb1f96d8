use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::version::entity::SortDirection;
use crate::version::error::StoreError;
use crate::version::ordering::order_by_clause;
use crate::version::semver::SemanticVersion;
use crate::version::storer::VersionStorer;
use crate::version::types::{Dependency, Mod, ModVersion, NewModVersion};

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: not_found column
    &["ALTER TABLE mods ADD COLUMN not_found INTEGER NOT NULL DEFAULT 0"],
];

const MOD_VERSION_COLUMNS: &str = "mv.id, mv.mod_id, mv.major, mv.minor, mv.patch, \
     mv.pre_release, mv.platform_constraint, mv.disabled, mv.published_at";

pub struct Store {
    conn: Mutex<Connection>,
    refresh_interval: i64,
}

impl Store {
    pub fn new(db_path: &Path, refresh_interval: i64) -> Result<Self, StoreError> {
        info!("Initializing version store at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        debug!("Database connection established");

        let store = Self {
            conn: Mutex::new(conn),
            refresh_interval,
        };

        store.create_schema()?;
        info!("Version store initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Get current timestamp in milliseconds since UNIX epoch
    fn current_timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS mods (
                id INTEGER PRIMARY KEY,
                slug TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                synced_at INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_mods_synced_at ON mods(synced_at);

            CREATE TABLE IF NOT EXISTS mod_versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mod_id INTEGER NOT NULL,
                version TEXT NOT NULL,
                major INTEGER NOT NULL,
                minor INTEGER NOT NULL,
                patch INTEGER NOT NULL,
                pre_release TEXT NOT NULL DEFAULT '',
                platform_constraint TEXT,
                disabled INTEGER NOT NULL DEFAULT 0,
                published_at INTEGER,
                FOREIGN KEY (mod_id) REFERENCES mods(id) ON DELETE CASCADE,
                UNIQUE(mod_id, version)
            );

            CREATE INDEX IF NOT EXISTS idx_mod_versions_order
                ON mod_versions(mod_id, major, minor, patch);

            CREATE TABLE IF NOT EXISTS dependencies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mod_version_id INTEGER NOT NULL,
                dependent_mod_id INTEGER NOT NULL,
                version_constraint TEXT NOT NULL,
                FOREIGN KEY (mod_version_id) REFERENCES mod_versions(id) ON DELETE CASCADE,
                FOREIGN KEY (dependent_mod_id) REFERENCES mods(id) ON DELETE CASCADE,
                UNIQUE(mod_version_id, dependent_mod_id)
            );

            CREATE TABLE IF NOT EXISTS resolved_dependencies (
                dependency_id INTEGER NOT NULL,
                resolved_version_id INTEGER NOT NULL,
                FOREIGN KEY (dependency_id) REFERENCES dependencies(id) ON DELETE CASCADE,
                FOREIGN KEY (resolved_version_id) REFERENCES mod_versions(id) ON DELETE CASCADE,
                PRIMARY KEY (dependency_id, resolved_version_id)
            );

            CREATE TABLE IF NOT EXISTS platform_versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version TEXT NOT NULL UNIQUE,
                major INTEGER NOT NULL,
                minor INTEGER NOT NULL,
                patch INTEGER NOT NULL,
                pre_release TEXT NOT NULL DEFAULT ''
            );
            "#,
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), StoreError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    match conn.execute(sql, []) {
                        Ok(_) => {}
                        Err(rusqlite::Error::SqliteFailure(_, Some(ref msg)))
                            if msg.contains("duplicate column name") =>
                        {
                            debug!("Column already exists, skipping: {}", sql);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
            debug!("Updated schema version to v{}", target_version);
        }

        Ok(())
    }

    fn row_to_mod_version(row: &Row<'_>) -> rusqlite::Result<ModVersion> {
        let major: i64 = row.get(2)?;
        let minor: i64 = row.get(3)?;
        let patch: i64 = row.get(4)?;
        let pre_release: String = row.get(5)?;

        Ok(ModVersion {
            id: row.get(0)?,
            mod_id: row.get(1)?,
            version: SemanticVersion::new(major as u64, minor as u64, patch as u64)
                .with_pre_release(&pre_release),
            platform_constraint: row.get(6)?,
            disabled: row.get(7)?,
            published_at: row.get(8)?,
        })
    }

    /// Insert a mod or update its slug and name
    pub fn upsert_mod(&self, m: &Mod) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO mods (id, slug, name) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET slug = excluded.slug, name = excluded.name
            "#,
            (m.id, &m.slug, &m.name),
        )?;
        Ok(())
    }

    pub fn get_mod(&self, mod_id: i64) -> Result<Option<Mod>, StoreError> {
        let conn = self.lock_conn()?;
        let found = conn
            .query_row(
                "SELECT id, slug, name FROM mods WHERE id = ?1",
                [mod_id],
                |row| {
                    Ok(Mod {
                        id: row.get(0)?,
                        slug: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// Insert a version of a mod, returning its id.
    ///
    /// Adding a version string the mod already has returns the existing id.
    pub fn add_version(&self, mod_id: i64, new_version: &NewModVersion) -> Result<i64, StoreError> {
        let conn = self.lock_conn()?;
        Self::insert_version(&conn, mod_id, new_version)?;

        let id = conn.query_row(
            "SELECT id FROM mod_versions WHERE mod_id = ?1 AND version = ?2",
            (mod_id, &new_version.version),
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Returns the number of inserted rows (0 when the version already exists)
    fn insert_version(
        conn: &Connection,
        mod_id: i64,
        new_version: &NewModVersion,
    ) -> Result<usize, StoreError> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM mods WHERE id = ?1)",
            [mod_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::ModNotFound(mod_id));
        }

        let parsed = SemanticVersion::parse(&new_version.version);
        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO mod_versions
                (mod_id, version, major, minor, patch, pre_release, platform_constraint, published_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            (
                mod_id,
                &new_version.version,
                parsed.major as i64,
                parsed.minor as i64,
                parsed.patch as i64,
                &parsed.pre_release,
                &new_version.platform_constraint,
                new_version.published_at,
            ),
        )?;
        Ok(inserted)
    }

    /// All versions of a mod in the given order
    pub fn versions(
        &self,
        mod_id: i64,
        direction: SortDirection,
    ) -> Result<Vec<ModVersion>, StoreError> {
        let conn = self.lock_conn()?;
        let query = format!(
            "SELECT {} FROM mod_versions mv WHERE mv.mod_id = ?1 ORDER BY {}",
            MOD_VERSION_COLUMNS,
            order_by_clause("mv", direction)
        );
        let mut stmt = conn.prepare(&query)?;

        let versions = stmt
            .query_map([mod_id], Self::row_to_mod_version)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(versions)
    }

    /// The newest publicly visible version of a mod
    pub fn latest_version(&self, mod_id: i64, now_ms: i64) -> Result<Option<ModVersion>, StoreError> {
        let conn = self.lock_conn()?;
        let query = format!(
            r#"
            SELECT {} FROM mod_versions mv
            WHERE mv.mod_id = ?1
              AND mv.disabled = 0
              AND mv.published_at IS NOT NULL
              AND mv.published_at <= ?2
            ORDER BY {}
            LIMIT 1
            "#,
            MOD_VERSION_COLUMNS,
            order_by_clause("mv", SortDirection::LatestFirst)
        );

        let latest = conn
            .query_row(&query, (mod_id, now_ms), Self::row_to_mod_version)
            .optional()?;
        Ok(latest)
    }

    pub fn set_disabled(&self, mod_version_id: i64, disabled: bool) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        let updated = conn.execute(
            "UPDATE mod_versions SET disabled = ?1 WHERE id = ?2",
            (disabled, mod_version_id),
        )?;
        if updated == 0 {
            return Err(StoreError::ModVersionNotFound(mod_version_id));
        }
        Ok(())
    }

    /// Declare that a mod version depends on another mod, returning the dependency id.
    ///
    /// Declaring the same dependent mod again replaces the constraint.
    pub fn add_dependency(
        &self,
        mod_version_id: i64,
        dependent_mod_id: i64,
        constraint: &str,
    ) -> Result<i64, StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO dependencies (mod_version_id, dependent_mod_id, version_constraint)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(mod_version_id, dependent_mod_id)
                DO UPDATE SET version_constraint = excluded.version_constraint
            "#,
            (mod_version_id, dependent_mod_id, constraint),
        )?;

        let id = conn.query_row(
            "SELECT id FROM dependencies WHERE mod_version_id = ?1 AND dependent_mod_id = ?2",
            (mod_version_id, dependent_mod_id),
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Versions a dependency was last resolved to, latest first
    pub fn resolved_versions(&self, dependency_id: i64) -> Result<Vec<ModVersion>, StoreError> {
        let conn = self.lock_conn()?;
        let query = format!(
            r#"
            SELECT {} FROM mod_versions mv
            JOIN resolved_dependencies rd ON rd.resolved_version_id = mv.id
            WHERE rd.dependency_id = ?1
            ORDER BY {}
            "#,
            MOD_VERSION_COLUMNS,
            order_by_clause("mv", SortDirection::LatestFirst)
        );
        let mut stmt = conn.prepare(&query)?;

        let versions = stmt
            .query_map([dependency_id], Self::row_to_mod_version)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(versions)
    }

    pub fn add_platform_version(&self, version: &str) -> Result<SemanticVersion, StoreError> {
        let parsed = SemanticVersion::parse(version);
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT OR IGNORE INTO platform_versions (version, major, minor, patch, pre_release)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            (
                version.trim(),
                parsed.major as i64,
                parsed.minor as i64,
                parsed.patch as i64,
                &parsed.pre_release,
            ),
        )?;
        Ok(parsed)
    }
}

impl VersionStorer for Store {
    fn get_mod_version(&self, mod_version_id: i64) -> Result<Option<ModVersion>, StoreError> {
        let conn = self.lock_conn()?;
        let query = format!(
            "SELECT {} FROM mod_versions mv WHERE mv.id = ?1",
            MOD_VERSION_COLUMNS
        );
        let found = conn
            .query_row(&query, [mod_version_id], Self::row_to_mod_version)
            .optional()?;
        Ok(found)
    }

    fn get_mod_versions(&self, mod_id: i64) -> Result<Vec<ModVersion>, StoreError> {
        self.versions(mod_id, SortDirection::LatestFirst)
    }

    fn get_dependencies(&self, mod_version_id: i64) -> Result<Vec<Dependency>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, mod_version_id, dependent_mod_id, version_constraint
            FROM dependencies
            WHERE mod_version_id = ?1
            ORDER BY id
            "#,
        )?;

        let dependencies = stmt
            .query_map([mod_version_id], |row| {
                Ok(Dependency {
                    id: row.get(0)?,
                    mod_version_id: row.get(1)?,
                    dependent_mod_id: row.get(2)?,
                    constraint: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(dependencies)
    }

    fn replace_resolved_dependencies(
        &self,
        dependency_id: i64,
        resolved_version_ids: Vec<i64>,
    ) -> Result<(), StoreError> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM resolved_dependencies WHERE dependency_id = ?1",
            [dependency_id],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO resolved_dependencies (dependency_id, resolved_version_id) VALUES (?1, ?2)",
            )?;
            for version_id in &resolved_version_ids {
                stmt.execute((dependency_id, version_id))?;
            }
        }

        tx.commit()?;
        debug!(
            "Dependency {} now resolves to {} versions",
            dependency_id,
            resolved_version_ids.len()
        );
        Ok(())
    }

    fn get_platform_versions(&self) -> Result<Vec<SemanticVersion>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT major, minor, patch, pre_release FROM platform_versions",
        )?;

        let versions = stmt
            .query_map([], |row| {
                let major: i64 = row.get(0)?;
                let minor: i64 = row.get(1)?;
                let patch: i64 = row.get(2)?;
                let pre_release: String = row.get(3)?;
                Ok(
                    SemanticVersion::new(major as u64, minor as u64, patch as u64)
                        .with_pre_release(&pre_release),
                )
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(versions)
    }

    fn replace_versions(
        &self,
        mod_id: i64,
        versions: Vec<NewModVersion>,
    ) -> Result<usize, StoreError> {
        debug!("Saving {} versions for mod {}", versions.len(), mod_id);

        let now = Self::current_timestamp_ms();

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        // Mods first seen through a sync get a placeholder slug and name
        tx.execute(
            r#"
            INSERT INTO mods (id, slug, name, synced_at, not_found)
            VALUES (?1, 'mod-' || ?1, 'mod-' || ?1, ?2, 0)
            ON CONFLICT(id) DO UPDATE SET synced_at = excluded.synced_at, not_found = 0
            "#,
            (mod_id, now),
        )?;

        let mut inserted = 0;
        for version in &versions {
            inserted += Self::insert_version(&tx, mod_id, version)?;
        }

        tx.commit()?;

        debug!("Stored {} new versions for mod {}", inserted, mod_id);
        Ok(inserted)
    }

    fn get_mods_needing_refresh(&self) -> Result<Vec<i64>, StoreError> {
        let now = Self::current_timestamp_ms();
        let threshold = now - self.refresh_interval;

        let conn = self.lock_conn()?;
        // Exclude mods marked as not found to avoid repeated fetch attempts
        let mut stmt = conn
            .prepare("SELECT id FROM mods WHERE synced_at < ?1 AND not_found = 0 ORDER BY id")?;

        let mods = stmt
            .query_map([threshold], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;

        Ok(mods)
    }

    fn mark_not_found(&self, mod_id: i64) -> Result<(), StoreError> {
        let now = Self::current_timestamp_ms();
        let conn = self.lock_conn()?;

        conn.execute(
            "UPDATE mods SET not_found = 1, synced_at = ?1 WHERE id = ?2",
            (now, mod_id),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const NOW: i64 = 1_700_000_000_000;

    fn setup_store() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let store = Store::new(&db_path, 86_400_000).unwrap();
        (temp_dir, store)
    }

    fn add_mod(store: &Store, id: i64) {
        store
            .upsert_mod(&Mod {
                id,
                slug: format!("mod-{id}"),
                name: format!("Mod {id}"),
            })
            .unwrap();
    }

    fn labels(versions: &[ModVersion]) -> Vec<String> {
        versions.iter().map(|v| v.version.to_string()).collect()
    }

    #[test]
    fn upsert_mod_updates_existing_mod() {
        let (_temp_dir, store) = setup_store();
        add_mod(&store, 1);

        store
            .upsert_mod(&Mod {
                id: 1,
                slug: "realism".to_string(),
                name: "Realism".to_string(),
            })
            .unwrap();

        let m = store.get_mod(1).unwrap().unwrap();
        assert_eq!(m.slug, "realism");
        assert_eq!(m.name, "Realism");
        assert_eq!(store.get_mod(2).unwrap(), None);
    }

    #[test]
    fn add_version_returns_existing_id_for_duplicate() {
        let (_temp_dir, store) = setup_store();
        add_mod(&store, 1);

        let first = store
            .add_version(1, &NewModVersion::published("1.0.0", NOW))
            .unwrap();
        let again = store
            .add_version(1, &NewModVersion::published("1.0.0", NOW))
            .unwrap();

        assert_eq!(first, again);
        assert_eq!(store.versions(1, SortDirection::Ascending).unwrap().len(), 1);
    }

    #[test]
    fn add_version_fails_for_unknown_mod() {
        let (_temp_dir, store) = setup_store();

        let result = store.add_version(99, &NewModVersion::published("1.0.0", NOW));

        assert!(matches!(result, Err(StoreError::ModNotFound(99))));
    }

    #[rstest]
    #[case(SortDirection::LatestFirst, vec!["1.0.0", "1.0.0-rc1", "1.0.0-beta", "0.9.0", "0.0.0"])]
    #[case(SortDirection::Ascending, vec!["0.0.0", "0.9.0", "1.0.0-beta", "1.0.0-rc1", "1.0.0"])]
    fn versions_are_ordered_like_the_comparator(
        #[case] direction: SortDirection,
        #[case] expected: Vec<&str>,
    ) {
        let (_temp_dir, store) = setup_store();
        add_mod(&store, 1);
        for v in ["1.0.0-rc1", "1.0.0", "garbage", "0.9.0", "1.0.0-beta"] {
            store
                .add_version(1, &NewModVersion::published(v, NOW))
                .unwrap();
        }

        let versions = store.versions(1, direction).unwrap();

        assert_eq!(labels(&versions), expected);
    }

    #[test]
    fn latest_version_skips_hidden_versions() {
        let (_temp_dir, store) = setup_store();
        add_mod(&store, 1);
        store
            .add_version(1, &NewModVersion::published("1.0.0", NOW - 10))
            .unwrap();
        let disabled = store
            .add_version(1, &NewModVersion::published("1.1.0", NOW - 10))
            .unwrap();
        store
            .add_version(1, &NewModVersion::published("1.2.0", NOW + 10))
            .unwrap();
        store
            .add_version(
                1,
                &NewModVersion {
                    version: "1.3.0".to_string(),
                    platform_constraint: None,
                    published_at: None,
                },
            )
            .unwrap();
        store.set_disabled(disabled, true).unwrap();

        let latest = store.latest_version(1, NOW).unwrap().unwrap();

        assert_eq!(latest.version, SemanticVersion::new(1, 0, 0));
    }

    #[test]
    fn latest_version_returns_none_without_versions() {
        let (_temp_dir, store) = setup_store();
        add_mod(&store, 1);

        assert_eq!(store.latest_version(1, NOW).unwrap(), None);
    }

    #[test]
    fn set_disabled_fails_for_unknown_version() {
        let (_temp_dir, store) = setup_store();

        let result = store.set_disabled(5, true);

        assert!(matches!(result, Err(StoreError::ModVersionNotFound(5))));
    }

    #[test]
    fn add_dependency_replaces_constraint_for_same_mod() {
        let (_temp_dir, store) = setup_store();
        add_mod(&store, 1);
        add_mod(&store, 2);
        let version_id = store
            .add_version(1, &NewModVersion::published("1.0.0", NOW))
            .unwrap();

        let first = store.add_dependency(version_id, 2, "^1.0").unwrap();
        let second = store.add_dependency(version_id, 2, "^2.0").unwrap();

        assert_eq!(first, second);
        let dependencies = store.get_dependencies(version_id).unwrap();
        assert_eq!(
            dependencies,
            vec![Dependency {
                id: first,
                mod_version_id: version_id,
                dependent_mod_id: 2,
                constraint: "^2.0".to_string(),
            }]
        );
    }

    #[test]
    fn replace_resolved_dependencies_overwrites_previous_resolution() {
        let (_temp_dir, store) = setup_store();
        add_mod(&store, 1);
        add_mod(&store, 2);
        let version_id = store
            .add_version(1, &NewModVersion::published("1.0.0", NOW))
            .unwrap();
        let old = store
            .add_version(2, &NewModVersion::published("1.0.0", NOW))
            .unwrap();
        let new = store
            .add_version(2, &NewModVersion::published("1.1.0", NOW))
            .unwrap();
        let dependency_id = store.add_dependency(version_id, 2, "^1.0").unwrap();

        store
            .replace_resolved_dependencies(dependency_id, vec![old])
            .unwrap();
        store
            .replace_resolved_dependencies(dependency_id, vec![old, new])
            .unwrap();

        let resolved = store.resolved_versions(dependency_id).unwrap();
        assert_eq!(labels(&resolved), vec!["1.1.0", "1.0.0"]);
    }

    #[test]
    fn add_platform_version_ignores_duplicates() {
        let (_temp_dir, store) = setup_store();

        store.add_platform_version("3.9.0").unwrap();
        store.add_platform_version("3.9.0").unwrap();
        let parsed = store.add_platform_version("3.10.0-beta").unwrap();

        assert_eq!(parsed, SemanticVersion::new(3, 10, 0).with_pre_release("beta"));
        assert_eq!(store.get_platform_versions().unwrap().len(), 2);
    }

    #[test]
    fn replace_versions_creates_mod_and_counts_new_versions() {
        let (_temp_dir, store) = setup_store();

        let first = store
            .replace_versions(
                5,
                vec![
                    NewModVersion::published("1.0.0", NOW),
                    NewModVersion::published("1.1.0", NOW),
                ],
            )
            .unwrap();
        let second = store
            .replace_versions(
                5,
                vec![
                    NewModVersion::published("1.1.0", NOW),
                    NewModVersion::published("1.2.0", NOW),
                ],
            )
            .unwrap();

        assert_eq!((first, second), (2, 1));
        assert_eq!(store.get_mod(5).unwrap().unwrap().slug, "mod-5");
        assert_eq!(
            labels(&store.get_mod_versions(5).unwrap()),
            vec!["1.2.0", "1.1.0", "1.0.0"]
        );
    }

    #[test]
    fn get_mods_needing_refresh_returns_stale_mods_only() {
        let (_temp_dir, store) = setup_store();
        // Mods added directly were never synced
        add_mod(&store, 1);
        store.replace_versions(2, vec![]).unwrap();

        assert_eq!(store.get_mods_needing_refresh().unwrap(), vec![1]);
    }

    #[test]
    fn get_mods_needing_refresh_excludes_not_found_mods() {
        let (_temp_dir, store) = setup_store();
        add_mod(&store, 1);
        add_mod(&store, 2);

        store.mark_not_found(1).unwrap();

        assert_eq!(store.get_mods_needing_refresh().unwrap(), vec![2]);
    }

    #[test]
    fn replace_versions_clears_not_found_flag() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        // Negative interval: every mod is stale
        let store = Store::new(&db_path, -1).unwrap();
        add_mod(&store, 1);
        store.mark_not_found(1).unwrap();
        assert!(store.get_mods_needing_refresh().unwrap().is_empty());

        store
            .replace_versions(1, vec![NewModVersion::published("1.0.0", NOW)])
            .unwrap();

        assert_eq!(store.get_mods_needing_refresh().unwrap(), vec![1]);
    }

    mod migrations {
        use super::*;

        fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
            let mut stmt = conn
                .prepare(&format!("PRAGMA table_info({})", table))
                .unwrap();
            stmt.query_map([], |row| row.get::<_, String>(1))
                .unwrap()
                .any(|name| name.unwrap() == column)
        }

        fn get_user_version(conn: &Connection) -> i32 {
            conn.pragma_query_value(None, "user_version", |row| row.get(0))
                .unwrap()
        }

        #[test]
        fn migration_adds_not_found_to_existing_database() {
            let temp_dir = TempDir::new().unwrap();
            let db_path = temp_dir.path().join("test.db");
            {
                let conn = Connection::open(&db_path).unwrap();
                conn.execute(
                    r#"
                    CREATE TABLE mods (
                        id INTEGER PRIMARY KEY,
                        slug TEXT NOT NULL UNIQUE,
                        name TEXT NOT NULL,
                        synced_at INTEGER NOT NULL DEFAULT 0
                    )
                    "#,
                    [],
                )
                .unwrap();
                conn.execute(
                    "INSERT INTO mods (id, slug, name) VALUES (1, 'sain', 'SAIN')",
                    [],
                )
                .unwrap();
            }

            let store = Store::new(&db_path, 86_400_000).unwrap();

            let conn = store.lock_conn().unwrap();
            assert!(column_exists(&conn, "mods", "not_found"));
            assert_eq!(get_user_version(&conn), MIGRATIONS.len() as i32);
            drop(conn);
            assert_eq!(store.get_mod(1).unwrap().unwrap().slug, "sain");
        }

        #[test]
        fn reopening_database_keeps_schema_version() {
            let temp_dir = TempDir::new().unwrap();
            let db_path = temp_dir.path().join("test.db");

            drop(Store::new(&db_path, 86_400_000).unwrap());
            let store = Store::new(&db_path, 86_400_000).unwrap();

            let conn = store.lock_conn().unwrap();
            assert_eq!(get_user_version(&conn), MIGRATIONS.len() as i32);
        }
    }
}
