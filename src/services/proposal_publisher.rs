use tracing::{info, warn};

use crate::models::change_set::ChangeSet;
use crate::models::local_state::TrackedLayout;
use crate::models::proposal::{
    branch_name, commit_body, update_title, Proposal, ProposalState, ReleaseLinks,
};
use crate::models::version::Version;
use crate::services::command_runner::CommandRunner;
use crate::services::git::Git;
use crate::services::review_client::{PullRequest, ReviewClient};
use crate::utils::config::UpdaterConfig;
use crate::utils::error::{Result, UpdateError};

/// How the publish stage ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new proposal was opened
    Published(PullRequest),
    /// A proposal for the branch was already open; nothing was submitted
    Skipped(PullRequest),
}

impl PublishOutcome {
    pub fn pull_request(&self) -> &PullRequest {
        match self {
            Self::Published(pull) | Self::Skipped(pull) => pull,
        }
    }

    pub fn state(&self) -> ProposalState {
        match self {
            Self::Published(_) => ProposalState::Published,
            Self::Skipped(_) => ProposalState::Skipped,
        }
    }
}

/// Creates the update branch and commit, then opens at most one proposal for it
#[derive(Debug)]
pub struct ProposalPublisher<R> {
    git: Git<R>,
    review: ReviewClient,
    layout: TrackedLayout,
    base_branch: String,
    links: ReleaseLinks,
    state: ProposalState,
    branch: Option<String>,
}

impl<R: CommandRunner> ProposalPublisher<R> {
    pub fn new(git: Git<R>, review: ReviewClient, config: &UpdaterConfig) -> Self {
        Self {
            git,
            review,
            layout: config.layout.clone(),
            base_branch: config.base_branch.clone(),
            links: ReleaseLinks::new(
                config.release_page_url.clone(),
                config.upstream_repository.clone(),
            ),
            state: ProposalState::Idle,
            branch: None,
        }
    }

    pub fn state(&self) -> ProposalState {
        self.state
    }

    fn transition(&mut self, next: ProposalState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(UpdateError::Publish(format!(
                "invalid proposal transition {} -> {}",
                self.state, next
            )));
        }
        info!("proposal: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Create `deps/<new>` and commit exactly the tracked files on it
    pub async fn create_branch_and_commit(
        &mut self,
        changes: &ChangeSet,
        old: &Version,
        new: &Version,
    ) -> Result<String> {
        if changes.is_empty() {
            return Err(UpdateError::NoChanges);
        }
        if self.state != ProposalState::Idle {
            return Err(UpdateError::Publish(format!(
                "cannot create a branch from state {}",
                self.state
            )));
        }

        let branch = branch_name(new);
        self.git.checkout_new_branch(&branch).await?;
        self.transition(ProposalState::BranchCreated)?;

        self.git.add_tracked(&self.layout.tracked_paths()).await?;
        self.git
            .commit(&update_title(old, new), &commit_body(old, new))
            .await?;
        self.transition(ProposalState::Committed)?;

        self.branch = Some(branch.clone());
        Ok(branch)
    }

    /// Adopt a branch committed by an earlier run so only publishing is retried
    pub async fn resume(&mut self, new: &Version) -> Result<String> {
        if self.state != ProposalState::Idle {
            return Err(UpdateError::Publish(format!(
                "cannot resume from state {}",
                self.state
            )));
        }

        let branch = branch_name(new);
        if !self.git.branch_exists(&branch).await? {
            return Err(UpdateError::Publish(format!(
                "branch {branch} does not exist; run `vendor-sync update` first"
            )));
        }

        // branch and commit exist already
        self.state = ProposalState::Committed;
        self.branch = Some(branch.clone());
        Ok(branch)
    }

    /// Open a proposal for `branch` unless one is already open
    pub async fn publish(
        &mut self,
        branch: &str,
        old: &Version,
        new: &Version,
        credential: &str,
    ) -> Result<PublishOutcome> {
        if self.state != ProposalState::Committed || self.branch.as_deref() != Some(branch) {
            return Err(UpdateError::Publish(format!(
                "branch {branch} has no commit to propose (state: {})",
                self.state
            )));
        }

        if let Some(existing) = self.review.find_open(branch, Some(credential)).await? {
            info!(
                "proposal already exists for version {new}: {} (nothing to do)",
                existing.html_url
            );
            self.transition(ProposalState::Skipped)?;
            return Ok(PublishOutcome::Skipped(existing));
        }

        let proposal = Proposal::for_update(old, new, &self.base_branch, &self.links);
        let created = match self.review.create(&proposal, credential).await {
            Ok(created) => created,
            Err(e) => {
                warn!("branch {branch} is committed but the proposal was not opened");
                return Err(e);
            }
        };
        self.transition(ProposalState::Published)?;

        info!(number = created.number, url = %created.html_url, "created proposal");
        Ok(PublishOutcome::Published(created))
    }
}
