use clap::{Parser, Subcommand};

use forge_versions::config::{self, ForgeConfig};
use forge_versions::logging;
use forge_versions::version::constraint::VersionConstraint;
use forge_versions::version::entity::SortDirection;
use forge_versions::version::registries::ForgeRegistry;
use forge_versions::version::resolver::{compatible_platform_versions, resolve_mod_version};
use forge_versions::version::semver::{SemanticVersion, find_latest, sort_version_strings};
use forge_versions::version::store::Store;
use forge_versions::version::storer::VersionStorer;
use forge_versions::version::sync::{refresh_mods, refresh_stale_mods};

#[derive(Parser)]
#[command(name = "forge-versions")]
#[command(version, about = "Version ordering and dependency resolution for The Forge")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sort version strings, latest first
    Sort {
        /// Sort oldest first instead
        #[arg(long)]
        ascending: bool,
        versions: Vec<String>,
    },
    /// Print the latest of the given versions
    Latest { versions: Vec<String> },
    /// Print the versions matching a constraint, latest first
    Satisfies {
        constraint: String,
        versions: Vec<String>,
    },
    /// Fetch mod versions from the Forge API (all stale mods when no id is given)
    Sync { mod_ids: Vec<i64> },
    /// List the stored versions of a mod, latest first
    List { mod_id: i64 },
    /// Declare that a mod version depends on another mod
    Depend {
        mod_version_id: i64,
        dependent_mod_id: i64,
        constraint: String,
    },
    /// Resolve and print the dependencies of a mod version
    Resolve { mod_version_id: i64 },
    /// Register game platform versions
    AddPlatform { versions: Vec<String> },
    /// Print the platform versions a mod version supports
    Compatible { mod_version_id: i64 },
}

fn open_store(config: &ForgeConfig) -> anyhow::Result<Store> {
    std::fs::create_dir_all(config::data_dir())?;
    Ok(Store::new(&config::db_path(), config.sync.refresh_interval)?)
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn run_sync(config: &ForgeConfig, mod_ids: Vec<i64>) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let registry = ForgeRegistry::new(&config.api.base_url, config.api.timeout())?;

    let synced = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            if mod_ids.is_empty() {
                refresh_stale_mods(&store, &registry).await
            } else {
                Ok(refresh_mods(&store, &registry, mod_ids).await)
            }
        })?;

    for mod_id in synced {
        println!("synced {mod_id}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ForgeConfig::load(&config::config_path())?;
    let _guard = logging::init(&config::log_path())?;

    match cli.command {
        Command::Sort {
            ascending,
            versions,
        } => {
            let direction = if ascending {
                SortDirection::Ascending
            } else {
                SortDirection::LatestFirst
            };
            for version in sort_version_strings(&versions, direction) {
                println!("{version}");
            }
        }
        Command::Latest { versions } => match find_latest(&versions) {
            Some(latest) => println!("{latest}"),
            None => anyhow::bail!("no valid version given"),
        },
        Command::Satisfies {
            constraint,
            versions,
        } => {
            let constraint = VersionConstraint::parse(&constraint)?;
            let matching: Vec<String> = versions
                .into_iter()
                .filter(|raw| {
                    SemanticVersion::try_parse(raw).is_some_and(|v| constraint.satisfies(&v))
                })
                .collect();
            for version in sort_version_strings(&matching, SortDirection::LatestFirst) {
                println!("{version}");
            }
        }
        Command::Sync { mod_ids } => run_sync(&config, mod_ids)?,
        Command::List { mod_id } => {
            let store = open_store(&config)?;
            let now = now_ms();
            for version in store
                .versions(mod_id, SortDirection::LatestFirst)?
                .into_iter()
                .filter(|v| config.listing.include_prerelease || !v.version.is_pre_release())
            {
                let state = if version.is_publicly_visible(now) {
                    ""
                } else {
                    " (hidden)"
                };
                println!("{}\t{}{}", version.id, version.version, state);
            }
        }
        Command::Depend {
            mod_version_id,
            dependent_mod_id,
            constraint,
        } => {
            VersionConstraint::parse(&constraint)?;
            let store = open_store(&config)?;
            let id = store.add_dependency(mod_version_id, dependent_mod_id, &constraint)?;
            println!("dependency {id}");
        }
        Command::Resolve { mod_version_id } => {
            let store = open_store(&config)?;
            for resolved in resolve_mod_version(&store, mod_version_id, now_ms())? {
                let versions: Vec<String> = resolved
                    .versions
                    .iter()
                    .map(|v| v.version.to_string())
                    .collect();
                println!(
                    "mod {} {}: {}",
                    resolved.dependency.dependent_mod_id,
                    resolved.dependency.constraint,
                    if versions.is_empty() {
                        "unresolved".to_string()
                    } else {
                        versions.join(", ")
                    }
                );
            }
        }
        Command::AddPlatform { versions } => {
            let store = open_store(&config)?;
            for version in versions {
                let parsed = store.add_platform_version(&version)?;
                println!("{parsed}");
            }
        }
        Command::Compatible { mod_version_id } => {
            let store = open_store(&config)?;
            let mod_version = store
                .get_mod_version(mod_version_id)?
                .ok_or_else(|| anyhow::anyhow!("mod version {mod_version_id} not found"))?;
            for version in compatible_platform_versions(&store, &mod_version)? {
                println!("{version}");
            }
        }
    }

    Ok(())
}
