use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::version::Version;

/// Branch that carries the update to `version`; identical across re-runs
pub fn branch_name(version: &Version) -> String {
    format!("deps/{version}")
}

/// Title shared by the commit and the proposal
pub fn update_title(old: &Version, new: &Version) -> String {
    format!("deps: update bundled library version from {old} to {new}")
}

/// Commit body restating the title as a sentence
pub fn commit_body(old: &Version, new: &Version) -> String {
    format!("Update the bundled library from version {old} to {new}.")
}

/// Where release pages for the upstream repository live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLinks {
    pub site_url: String,
    pub repository: String,
}

impl ReleaseLinks {
    pub fn new(site_url: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            repository: repository.into(),
        }
    }

    pub fn release_page(&self, version: &Version) -> String {
        format!(
            "{}/{}/releases/tag/{}",
            self.site_url.trim_end_matches('/'),
            self.repository,
            version
        )
    }

    /// Markdown link to the release page
    pub fn markdown(&self, version: &Version) -> String {
        format!("[{}]({})", version, self.release_page(version))
    }
}

/// A pending review request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub branch: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

impl Proposal {
    pub fn for_update(old: &Version, new: &Version, base: &str, links: &ReleaseLinks) -> Self {
        Self {
            branch: branch_name(new),
            base: base.to_string(),
            title: update_title(old, new),
            body: format!(
                "This commit updates the bundled library from version {} to {}.",
                links.markdown(old),
                links.markdown(new)
            ),
        }
    }
}

/// Publication lifecycle: `Idle -> BranchCreated -> Committed -> Published | Skipped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    Idle,
    BranchCreated,
    Committed,
    Published,
    Skipped,
}

impl ProposalState {
    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::BranchCreated)
                | (Self::BranchCreated, Self::Committed)
                | (Self::Committed, Self::Published | Self::Skipped)
        )
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::BranchCreated => "branch-created",
            Self::Committed => "committed",
            Self::Published => "published",
            Self::Skipped => "skipped",
        };
        write!(f, "{name}")
    }
}
