use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::models::local_state::LocalState;
use crate::models::release::ReleaseDescriptor;
use crate::models::version::Version;
use crate::services::artifact_installer::ArtifactInstaller;
use crate::services::change_tracker::ChangeTracker;
use crate::services::command_runner::CommandRunner;
use crate::services::git::Git;
use crate::services::proposal_publisher::{ProposalPublisher, PublishOutcome};
use crate::services::release_client::ReleaseClient;
use crate::services::review_client::{PullRequest, ReviewClient};
use crate::services::validation_gate::ValidationGate;
use crate::utils::config::UpdaterConfig;
use crate::utils::error::{Result, UpdateError};

/// Local version compared against the latest upstream release
#[derive(Debug, Clone)]
pub struct ReleaseCheck {
    pub current: Version,
    pub latest: ReleaseDescriptor,
}

impl ReleaseCheck {
    /// Whether `update` would install the latest release
    pub fn needs_update(&self) -> bool {
        self.latest.is_installable() && self.latest.tag > self.current
    }
}

/// How a successful run ended. Every variant exits with status 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    UpToDate {
        current: Version,
    },
    /// Upstream is older than the bundled version
    DowngradeRefused {
        current: Version,
        latest: Version,
    },
    Published {
        from: Version,
        to: Version,
        branch: String,
        pull_request: PullRequest,
    },
    /// A proposal for this version was already open
    AlreadyProposed {
        from: Version,
        to: Version,
        branch: String,
        pull_request: PullRequest,
    },
}

impl RunOutcome {
    fn from_publish(from: Version, to: Version, branch: String, outcome: PublishOutcome) -> Self {
        info!(
            state = %outcome.state(),
            url = %outcome.pull_request().html_url,
            "publish finished for {branch}"
        );
        match outcome {
            PublishOutcome::Published(pull_request) => Self::Published {
                from,
                to,
                branch,
                pull_request,
            },
            PublishOutcome::Skipped(pull_request) => Self::AlreadyProposed {
                from,
                to,
                branch,
                pull_request,
            },
        }
    }
}

/// The release -> install -> validate -> track -> publish pipeline
pub struct UpdateWorkflow<R> {
    root: PathBuf,
    config: UpdaterConfig,
    release_client: ReleaseClient,
    installer: ArtifactInstaller,
    gate: ValidationGate<R>,
    tracker: ChangeTracker<R>,
    publisher: ProposalPublisher<R>,
}

impl<R: CommandRunner + Clone> UpdateWorkflow<R> {
    pub fn new(root: &Path, config: UpdaterConfig, runner: R) -> Result<Self> {
        let release_client = ReleaseClient::new(&config)?;
        let review_client = ReviewClient::new(&config)?;
        let git = Git::new(runner.clone(), root, config.vcs_timeout());

        Ok(Self {
            root: root.to_path_buf(),
            installer: ArtifactInstaller::new(release_client.clone(), root, &config),
            gate: ValidationGate::new(runner, root, config.test_command.clone()),
            tracker: ChangeTracker::new(git.clone(), config.layout.clone()),
            publisher: ProposalPublisher::new(git, review_client, &config),
            release_client,
            config,
        })
    }

    /// Read-only comparison of the local and latest upstream versions
    pub async fn check(&self) -> Result<ReleaseCheck> {
        let local = LocalState::load(&self.root, &self.config.layout)?;
        let latest = self.release_client.fetch_latest().await?;
        Ok(ReleaseCheck {
            current: local.version,
            latest,
        })
    }

    /// Run every stage in order; the first failure ends the run.
    ///
    /// `credential` is only required once a branch has been committed.
    pub async fn run(&mut self, credential: Option<String>) -> Result<RunOutcome> {
        let local = LocalState::load(&self.root, &self.config.layout)?;
        info!("bundled version: {}", local.version);

        let release = self.release_client.fetch_latest().await?;
        if let Err(e) = release.ensure_installable() {
            warn!("refusing to update to draft/pre-release version: {}", release.tag);
            return Err(e);
        }

        match release.tag.cmp(&local.version) {
            Ordering::Equal => {
                info!("nothing to do here: version {} is the latest", local.version);
                return Ok(RunOutcome::UpToDate {
                    current: local.version,
                });
            }
            Ordering::Less => {
                warn!(
                    "latest release {} is older than bundled {}: downgrades are not supported",
                    release.tag, local.version
                );
                return Ok(RunOutcome::DowngradeRefused {
                    current: local.version,
                    latest: release.tag,
                });
            }
            Ordering::Greater => {}
        }

        let archive_url = self.release_client.resolve_archive_url(&release)?;
        info!("updating {} -> {}", local.version, release.tag);
        let report = self.installer.install(&release, &archive_url).await?;
        info!(
            size = report.archive_size,
            sha256 = %report.archive_sha256,
            "installed {} into {} tracked files",
            report.version,
            report.written.len()
        );

        self.gate.validate().await?;

        let changes = self.tracker.expect_changes().await?;
        let branch = self
            .publisher
            .create_branch_and_commit(&changes, &local.version, &release.tag)
            .await?;
        info!("committed update on branch {branch}");

        let credential = match self.require_credential(credential) {
            Ok(credential) => credential,
            Err(e) => {
                warn!(
                    "branch {branch} is {} but cannot be published without a credential",
                    self.publisher.state()
                );
                return Err(e);
            }
        };
        let outcome = self
            .publisher
            .publish(&branch, &local.version, &release.tag, &credential)
            .await?;

        Ok(RunOutcome::from_publish(local.version, release.tag, branch, outcome))
    }

    /// Retry only the publish stage for a branch committed by an earlier run
    pub async fn retry_publish(
        &mut self,
        from: &Version,
        to: &Version,
        credential: Option<String>,
    ) -> Result<RunOutcome> {
        let credential = self.require_credential(credential)?;
        let branch = self.publisher.resume(to).await?;
        let outcome = self.publisher.publish(&branch, from, to, &credential).await?;
        Ok(RunOutcome::from_publish(from.clone(), to.clone(), branch, outcome))
    }

    fn require_credential(&self, credential: Option<String>) -> Result<String> {
        credential
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| UpdateError::MissingCredential(self.config.credential_env.clone()))
    }
}
