//! Configuration for a sync run.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::SyncError;

/// Default Asana REST endpoint.
pub const DEFAULT_API_URL: &str = "https://app.asana.com/api/1.0";

/// Repository name used when `GITHUB_REPOSITORY` is absent or malformed.
const UNKNOWN_REPOSITORY: &str = "unknown";

const ENV_ACCESS_TOKEN: &str = "ASANA_PAT";
const ENV_WORKSPACE_ID: &str = "ASANA_WORKSPACE_ID";
const ENV_PROJECT_ID: &str = "ASANA_PROJECT_ID";
const ENV_SECTION: &str = "ASANA_SECTION";
const ENV_API_URL: &str = "ASANA_API_URL";
const ENV_TIMEOUT_SECS: &str = "ASANA_TIMEOUT_SECS";
const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";

/// Validated settings, built once at startup and passed by reference.
#[derive(Clone)]
pub struct Config {
    /// Asana personal access token.
    pub access_token: String,
    /// Workspace new tasks are created in.
    pub workspace_id: String,
    /// Project whose tasks are scanned and created.
    pub project_id: String,
    /// Section new tasks are placed into.
    pub section_name: String,
    /// Repository name (without owner) used in notes and correlation markers.
    pub repository_name: String,
    /// Asana API base URL.
    pub api_url: String,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"<redacted>")
            .field("workspace_id", &self.workspace_id)
            .field("project_id", &self.project_id)
            .field("section_name", &self.section_name)
            .field("repository_name", &self.repository_name)
            .field("api_url", &self.api_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as missing. Every missing required key is
    /// reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut require = |key: &'static str| {
            let value = get(key);
            if value.is_none() {
                missing.push(key.to_string());
            }
            value.unwrap_or_default()
        };

        let access_token = require(ENV_ACCESS_TOKEN);
        let workspace_id = require(ENV_WORKSPACE_ID);
        let project_id = require(ENV_PROJECT_ID);
        let section_name = require(ENV_SECTION);

        let request_timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    missing.push(format!(
                        "{ENV_TIMEOUT_SECS} (expected a positive integer, got {raw:?})"
                    ));
                    None
                }
            },
            None => None,
        };

        if !missing.is_empty() {
            return Err(SyncError::Config { missing });
        }

        Ok(Self {
            access_token,
            workspace_id,
            project_id,
            section_name,
            repository_name: repository_name(get(ENV_REPOSITORY).as_deref()),
            api_url: get(ENV_API_URL).map_or_else(
                || DEFAULT_API_URL.to_string(),
                |url| url.trim_end_matches('/').to_string(),
            ),
            request_timeout,
        })
    }
}

/// Extract the repository name from an `owner/repo` slug.
fn repository_name(slug: Option<&str>) -> String {
    slug.and_then(|s| s.split('/').nth(1))
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_REPOSITORY)
        .to_string()
}
