use tracing::{debug, info};

use crate::models::change_set::ChangeSet;
use crate::models::local_state::TrackedLayout;
use crate::services::command_runner::CommandRunner;
use crate::services::git::Git;
use crate::utils::error::{Result, UpdateError};

/// Confirms that installation actually modified tracked files
#[derive(Debug, Clone)]
pub struct ChangeTracker<R> {
    git: Git<R>,
    layout: TrackedLayout,
}

impl<R: CommandRunner> ChangeTracker<R> {
    pub fn new(git: Git<R>, layout: TrackedLayout) -> Self {
        Self { git, layout }
    }

    /// Tracked files modified in place, per `git status --porcelain`.
    /// Other dirty files in the working tree are ignored.
    pub async fn modified_files(&self) -> Result<ChangeSet> {
        let status = self.git.status_porcelain().await?;
        let changes = ChangeSet::from_porcelain(&status);
        for path in changes.iter().filter(|path| !self.layout.is_tracked(path)) {
            debug!("ignoring untracked modification: {}", path.display());
        }
        Ok(changes
            .into_iter()
            .filter(|path| self.layout.is_tracked(path))
            .collect())
    }

    /// Like [`Self::modified_files`], failing with `NoChanges` when nothing changed
    pub async fn expect_changes(&self) -> Result<ChangeSet> {
        let changes = self.modified_files().await?;
        if changes.is_empty() {
            return Err(UpdateError::NoChanges);
        }

        info!(
            "{} modified files: {}",
            changes.len(),
            changes
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(changes)
    }
}
