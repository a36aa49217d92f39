use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::models::release::{GithubRelease, ReleaseDescriptor};
use crate::utils::config::UpdaterConfig;
use crate::utils::error::{Result, UpdateError};

pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
pub const GITHUB_API_VERSION: &str = "2022-11-28";

pub fn user_agent() -> String {
    format!("vendor-sync/{}", env!("CARGO_PKG_VERSION"))
}

/// Archive written to scratch space by [`ReleaseClient::download_archive`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArchive {
    pub path: PathBuf,
    pub size: u64,
    /// Hex SHA-256 of the archive bytes
    pub sha256: String,
}

/// Release feed client for the upstream repository
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    /// HTTP client with the configured timeout
    client: Client,
    /// API base URL (configurable for testing)
    api_url: String,
    /// Upstream repository as `owner/name`
    repository: String,
    /// Release asset holding the vendored sources
    asset_name: String,
    user_agent: String,
}

impl ReleaseClient {
    pub fn new(config: &UpdaterConfig) -> Result<Self> {
        Self::with_api_url(
            config.api_url.clone(),
            config.upstream_repository.clone(),
            config.asset_name.clone(),
            config.http_timeout(),
        )
    }

    /// Create a client against a custom API URL (for testing)
    pub fn with_api_url(
        api_url: String,
        repository: String,
        asset_name: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpdateError::ReleaseFeed(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            repository,
            asset_name,
            user_agent: user_agent(),
        })
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    /// Fetch the latest published release.
    ///
    /// One request, no retries. The tag must be a strict `v<int>.<int>.<int>`.
    pub async fn fetch_latest(&self) -> Result<ReleaseDescriptor> {
        let url = format!("{}/repos/{}/releases/latest", self.api_url, self.repository);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await
            .map_err(|e| UpdateError::ReleaseFeed(describe_request_error("GET", &url, &e)))?;

        let response = ensure_success("GET", &url, response)
            .await
            .map_err(UpdateError::ReleaseFeed)?;

        let release: GithubRelease = response.json().await.map_err(|e| {
            UpdateError::ReleaseFeed(format!("Failed to parse release from {url}: {e}"))
        })?;

        info!(
            tag = %release.tag_name,
            draft = release.draft,
            prerelease = release.prerelease,
            "fetched latest upstream release"
        );
        ReleaseDescriptor::from_github(release)
    }

    /// Download URL of the configured archive asset
    pub fn resolve_archive_url(&self, descriptor: &ReleaseDescriptor) -> Result<String> {
        descriptor.asset_url(&self.asset_name).map(str::to_string)
    }

    /// Stream an asset into `destination`, which must not exist yet
    pub async fn download_archive(&self, url: &str, destination: &Path) -> Result<DownloadedArchive> {
        debug!("GET {url} -> {}", destination.display());

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/octet-stream")
            .send()
            .await
            .map_err(|e| UpdateError::Installation(describe_request_error("GET", url, &e)))?;

        let response = ensure_success("GET", url, response)
            .await
            .map_err(UpdateError::Installation)?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
            .await
            .map_err(|e| {
                UpdateError::Installation(format!(
                    "Failed to create {}: {}",
                    destination.display(),
                    e
                ))
            })?;

        let mut hasher = Sha256::new();
        let mut size = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                UpdateError::Installation(describe_request_error("GET", url, &e))
            })?;
            hasher.update(&chunk);
            size += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(|e| {
                UpdateError::Installation(format!(
                    "Failed to write {}: {}",
                    destination.display(),
                    e
                ))
            })?;
        }
        file.flush().await.map_err(|e| {
            UpdateError::Installation(format!("Failed to flush {}: {}", destination.display(), e))
        })?;

        Ok(DownloadedArchive {
            path: destination.to_path_buf(),
            size,
            sha256: format!("{:x}", hasher.finalize()),
        })
    }
}

/// Render a transport error with method and URL
pub(crate) fn describe_request_error(method: &str, url: &str, err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("{method} {url} timed out: {err}")
    } else if err.is_connect() {
        format!("{method} {url} could not connect: {err}")
    } else {
        format!("{method} {url} failed: {err}")
    }
}

/// Pass successful responses through; render others with status and body
pub(crate) async fn ensure_success(
    method: &str,
    url: &str,
    response: Response,
) -> std::result::Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
    Err(format!("{method} {url} returned {status}: {}", body.trim()))
}
