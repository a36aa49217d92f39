// Configuration utilities and TOML parsing

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::local_state::TrackedLayout;
use crate::utils::error::{Result, UpdateError};
use crate::utils::validation::validate_repository_slug;

/// Config file looked up in the project root when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "vendor-sync.toml";

/// Settings for one vendored library. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Repository whose releases are tracked (`owner/name`)
    pub upstream_repository: String,
    /// Repository proposals are opened against
    pub proposal_repository: String,
    /// Identity owning the proposal branches
    pub proposal_owner: String,
    /// Branch proposals target
    pub base_branch: String,
    /// REST API base URL for both release feed and proposal service
    pub api_url: String,
    /// Web base URL used to link release pages
    pub release_page_url: String,
    /// Release asset holding the vendored sources
    pub asset_name: String,
    /// Annotation line prepended to vendored sources
    pub guard_marker: String,
    /// Lowest major version rewritten in the documentation
    pub docs_version_floor: u64,
    /// Command validating the patched tree
    pub test_command: Vec<String>,
    /// Environment variable holding the proposal credential
    pub credential_env: String,
    /// Timeout for every HTTP request, in seconds
    pub http_timeout_secs: u64,
    /// Timeout for every version-control command, in seconds
    pub vcs_timeout_secs: u64,
    /// Files the installer may modify
    pub layout: TrackedLayout,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            upstream_repository: "simdutf/simdutf".to_string(),
            proposal_repository: "charlievieth/simdutf".to_string(),
            proposal_owner: "charlievieth".to_string(),
            base_branch: "master".to_string(),
            api_url: "https://api.github.com".to_string(),
            release_page_url: "https://github.com".to_string(),
            asset_name: "singleheader.zip".to_string(),
            guard_marker: "//go:build !libsimdutf".to_string(),
            docs_version_floor: 7,
            test_command: vec![
                "go".to_string(),
                "test".to_string(),
                "-race".to_string(),
                "./...".to_string(),
            ],
            credential_env: "SIMDUTF_GH_ACTIONS".to_string(),
            http_timeout_secs: 5,
            vcs_timeout_secs: 60,
            layout: TrackedLayout::default(),
        }
    }
}

impl UpdaterConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn vcs_timeout(&self) -> Duration {
        Duration::from_secs(self.vcs_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        validate_repository_slug(&self.upstream_repository)?;
        validate_repository_slug(&self.proposal_repository)?;

        let required = [
            ("proposal_owner", &self.proposal_owner),
            ("base_branch", &self.base_branch),
            ("api_url", &self.api_url),
            ("asset_name", &self.asset_name),
            ("guard_marker", &self.guard_marker),
            ("credential_env", &self.credential_env),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(UpdateError::Config(format!("'{field}' cannot be empty")));
            }
        }

        if self.test_command.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(UpdateError::Config(
                "'test_command' must name a program to run".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 || self.vcs_timeout_secs == 0 {
            return Err(UpdateError::Config("Timeouts must be at least 1 second".to_string()));
        }

        self.layout.validate()
    }
}

/// Configuration parsing and validation utilities
pub struct ConfigParser;

impl ConfigParser {
    /// Load the configuration for a project root.
    ///
    /// An explicit path must exist; the default file is optional and falls
    /// back to built-in defaults when absent.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<UpdaterConfig> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = default_config_path(root);
                if !default_path.exists() {
                    let config = UpdaterConfig::default();
                    config.validate()?;
                    return Ok(config);
                }
                default_path
            }
        };

        Self::load_file(&path)
    }

    pub fn load_file(path: &Path) -> Result<UpdaterConfig> {
        if !path.exists() {
            return Err(UpdateError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            UpdateError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<UpdaterConfig> {
        let config: UpdaterConfig = toml::from_str(content)
            .map_err(|e| UpdateError::Config(format!("Invalid TOML syntax: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CONFIG_FILE)
}
