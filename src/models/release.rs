use serde::{Deserialize, Serialize};

use crate::models::version::Version;
use crate::utils::error::{Result, UpdateError};

/// Release metadata as returned by the release feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubRelease {
    /// Tag the release was cut from
    pub tag_name: String,
    /// Unpublished draft
    #[serde(default)]
    pub draft: bool,
    /// Marked as a pre-release upstream
    #[serde(default)]
    pub prerelease: bool,
    /// Release page
    pub html_url: Option<String>,
    /// Published downloadable assets
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable release asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// A validated upstream release, fetched once per run and passed through every stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub tag: Version,
    pub is_draft: bool,
    pub is_prerelease: bool,
    pub html_url: Option<String>,
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseDescriptor {
    /// Validate a feed response. Fails if the tag is not a strict `v<int>.<int>.<int>`.
    pub fn from_github(release: GithubRelease) -> Result<Self> {
        Ok(Self {
            tag: Version::parse_release_tag(&release.tag_name)?,
            is_draft: release.draft,
            is_prerelease: release.prerelease,
            html_url: release.html_url,
            assets: release.assets,
        })
    }

    pub fn is_installable(&self) -> bool {
        !self.is_draft && !self.is_prerelease
    }

    /// Abort with `UnsafeRelease` for drafts and pre-releases
    pub fn ensure_installable(&self) -> Result<()> {
        if self.is_installable() {
            return Ok(());
        }
        Err(UpdateError::UnsafeRelease {
            tag: self.tag.to_string(),
            draft: self.is_draft,
            prerelease: self.is_prerelease,
        })
    }

    /// Download URL of the asset whose name matches exactly
    pub fn asset_url(&self, name: &str) -> Result<&str> {
        self.assets
            .iter()
            .find(|asset| asset.name == name)
            .map(|asset| asset.browser_download_url.as_str())
            .ok_or_else(|| UpdateError::AssetNotFound {
                tag: self.tag.to_string(),
                asset: name.to_string(),
                available: if self.assets.is_empty() {
                    "none".to_string()
                } else {
                    self.assets
                        .iter()
                        .map(|asset| asset.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            })
    }
}
