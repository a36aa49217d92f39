// Error taxonomy for the update workflow

use std::fmt;

/// Every way a run can fail. Each variant is terminal for the run.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// Version string could not be parsed or does not match the required pattern
    #[error("Malformed version '{input}': {reason}")]
    MalformedVersion { input: String, reason: String },

    /// Upstream release is a draft or pre-release
    #[error("Refusing to update to draft/pre-release version {tag} (draft: {draft}, prerelease: {prerelease})")]
    UnsafeRelease {
        tag: String,
        draft: bool,
        prerelease: bool,
    },

    /// Release does not publish the expected archive
    #[error("Release {tag} has no asset named '{asset}' (available: {available})")]
    AssetNotFound {
        tag: String,
        asset: String,
        available: String,
    },

    /// Release feed request failed (network, timeout or non-success status)
    #[error("Release feed request failed: {0}")]
    ReleaseFeed(String),

    /// Download, extraction or patching failed; tracked files were not touched
    #[error("Installation failed: {0}")]
    Installation(String),

    /// Test command failed against the patched tree
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Installation produced no modified tracked files
    #[error("No tracked files were modified by the installation")]
    NoChanges,

    /// A version-control command failed
    #[error("Version control error: {0}")]
    VersionControl(String),

    /// Proposal credential is absent at publish time
    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    /// Proposal service rejected a request
    #[error("Publish failed: {0}")]
    Publish(String),

    /// Configuration file could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl UpdateError {
    pub fn malformed_version(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedVersion {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Short stage label used in operator output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedVersion { .. } => "malformed-version",
            Self::UnsafeRelease { .. } => "unsafe-release",
            Self::AssetNotFound { .. } => "asset-not-found",
            Self::ReleaseFeed(_) => "release-feed",
            Self::Installation(_) => "installation",
            Self::Validation(_) => "validation",
            Self::NoChanges => "no-changes",
            Self::VersionControl(_) => "version-control",
            Self::MissingCredential(_) => "missing-credential",
            Self::Publish(_) => "publish",
            Self::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, UpdateError>;

/// Operator-facing rendering of a failed run
#[derive(Debug, Clone)]
pub struct UserError {
    pub message: String,
    pub hint: Option<String>,
    pub exit_code: i32,
}

impl UserError {
    pub fn from_update_error(err: &UpdateError) -> Self {
        let hint = match err {
            UpdateError::UnsafeRelease { .. } => Some(
                "Wait for a final release to be published upstream, then re-run.".to_string(),
            ),
            UpdateError::Validation(_) => Some(
                "Installed files were left in place for inspection. Restore them with `git checkout -- .` once done.".to_string(),
            ),
            UpdateError::MissingCredential(var) => Some(format!(
                "The update branch is committed and ready. Export {var} and run `vendor-sync publish` to open the proposal."
            )),
            UpdateError::Publish(_) => Some(
                "Branch and commit remain; retry with `vendor-sync publish --from <old> --to <new>`.".to_string(),
            ),
            UpdateError::NoChanges => Some(
                "The upstream payload matched the tracked files; nothing was committed.".to_string(),
            ),
            _ => None,
        };

        Self {
            message: format!("[{}] {}", err.kind(), err),
            hint,
            exit_code: 1,
        }
    }

    pub fn print(&self) {
        eprintln!("{self}");
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n\n{hint}")?;
        }
        Ok(())
    }
}
