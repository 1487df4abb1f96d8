//! Forge API implementation

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::semver::{SemanticVersion, compare};
use crate::version::types::NewModVersion;

/// Default base URL for the Forge
pub const DEFAULT_BASE_URL: &str = "https://forge.sp-tarkov.com";

/// Response from the mod versions endpoint
#[derive(Debug, Deserialize)]
struct VersionsResponse {
    data: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: String,
    #[serde(default)]
    spt_version_constraint: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

impl VersionEntry {
    fn into_new_version(self) -> NewModVersion {
        let published_at = self.published_at.as_deref().and_then(|raw| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .inspect_err(|e| debug!("Ignoring unparseable published_at {:?}: {}", raw, e))
                .ok()
                .map(|at| at.timestamp_millis())
        });

        NewModVersion {
            version: self.version,
            platform_constraint: self
                .spt_version_constraint
                .filter(|constraint| !constraint.trim().is_empty()),
            published_at,
        }
    }
}

/// Registry implementation for the Forge HTTP API
pub struct ForgeRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl ForgeRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent("forge-versions")
                .timeout(timeout)
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn retry_after_secs(response: &reqwest::Response) -> Option<u64> {
        response
            .headers()
            .get(reqwest::header::RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse()
            .ok()
    }
}

#[async_trait::async_trait]
impl Registry for ForgeRegistry {
    async fn fetch_mod_versions(&self, mod_id: i64) -> Result<Vec<NewModVersion>, RegistryError> {
        let url = format!("{}/api/v0/mod/{}/versions", self.base_url, mod_id);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(mod_id));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RegistryError::RateLimited {
                retry_after_secs: Self::retry_after_secs(&response),
            });
        }

        if !status.is_success() {
            warn!("Forge API returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body: VersionsResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Forge API response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        // Sort versions oldest first, dropping ones that are not versions at all
        let mut versions: Vec<(SemanticVersion, NewModVersion)> = body
            .data
            .into_iter()
            .filter_map(|entry| match SemanticVersion::try_parse(&entry.version) {
                Some(parsed) => Some((parsed, entry.into_new_version())),
                None => {
                    warn!("Skipping invalid version {:?} of mod {}", entry.version, mod_id);
                    None
                }
            })
            .collect();

        versions.sort_by(|(a, _), (b, _)| compare(a, b));

        Ok(versions.into_iter().map(|(_, v)| v).collect())
    }
}
