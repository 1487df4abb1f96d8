//! Tracing setup
//!
//! Logs go to a JSON file in the data directory so command output on stdout
//! stays clean. The filter is read from `FORGE_VERSIONS_LOG` and defaults to
//! `info`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "FORGE_VERSIONS_LOG";

const DEFAULT_FILTER: &str = "info";

fn env_filter(directive: Option<String>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to `log_path`.
///
/// The returned guard flushes buffered lines on drop and must be kept alive
/// for the lifetime of the program.
pub fn init(log_path: &Path) -> anyhow::Result<WorkerGuard> {
    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log path has no file name: {:?}", log_path))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(std::env::var(LOG_FILTER_ENV).ok()))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tracing::level_filters::LevelFilter;

    #[rstest]
    #[case(None, LevelFilter::INFO)]
    #[case(Some("debug"), LevelFilter::DEBUG)]
    #[case(Some("forge_versions=trace"), LevelFilter::TRACE)]
    #[case(Some("forge_versions=loud"), LevelFilter::INFO)] // invalid level falls back
    fn env_filter_uses_directive_or_default(
        #[case] directive: Option<&str>,
        #[case] expected: LevelFilter,
    ) {
        let filter = env_filter(directive.map(|d| d.to_string()));
        assert_eq!(filter.max_level_hint(), Some(expected));
    }
}
