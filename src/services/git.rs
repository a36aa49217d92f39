use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::services::command_runner::{CommandOutput, CommandRunner, Invocation};
use crate::utils::error::{Result, UpdateError};

/// Version-control commands against the working tree
#[derive(Debug, Clone)]
pub struct Git<R> {
    runner: R,
    root: PathBuf,
    timeout: Duration,
}

impl<R: CommandRunner> Git<R> {
    pub fn new(runner: R, root: &Path, timeout: Duration) -> Self {
        Self {
            runner,
            root: root.to_path_buf(),
            timeout,
        }
    }

    /// `git status --porcelain`
    pub async fn status_porcelain(&self) -> Result<String> {
        let output = self.run_checked(&["status", "--porcelain"]).await?;
        Ok(output.stdout)
    }

    /// `git checkout -b <branch>`
    pub async fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        self.run_checked(&["checkout", "-b", branch]).await?;
        Ok(())
    }

    /// Stage the given tracked paths only, never the whole tree
    pub async fn add_tracked(&self, paths: &[PathBuf]) -> Result<()> {
        let paths: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        let mut args = vec!["add", "--update", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_checked(&args).await?;
        Ok(())
    }

    /// `git commit -m <title> -m <body>`
    pub async fn commit(&self, title: &str, body: &str) -> Result<()> {
        self.run_checked(&["commit", "-m", title, "-m", body]).await?;
        Ok(())
    }

    /// Whether a local branch with this name exists
    pub async fn branch_exists(&self, branch: &str) -> Result<bool> {
        let reference = format!("refs/heads/{branch}");
        let output = self
            .run(&["rev-parse", "--verify", "--quiet", &reference])
            .await?;
        match output.exit_code {
            0 => Ok(true),
            1 => Ok(false),
            _ => Err(self.failure(&["rev-parse", "--verify", "--quiet", &reference], &output)),
        }
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        Invocation::new("git", &self.root)
            .args(args.iter().copied())
            .with_timeout(self.timeout)
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let invocation = self.invocation(args);
        debug!("running {}", invocation.command_line());
        self.runner.run(&invocation).await.map_err(|e| {
            UpdateError::VersionControl(format!(
                "failed to run `{}`: {}",
                invocation.command_line(),
                e
            ))
        })
    }

    async fn run_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(args).await?;
        if !output.success() {
            return Err(self.failure(args, &output));
        }
        Ok(output)
    }

    fn failure(&self, args: &[&str], output: &CommandOutput) -> UpdateError {
        UpdateError::VersionControl(format!(
            "`{}` exited with status {}\nstdout:\n{}\nstderr:\n{}",
            self.invocation(args).command_line(),
            output.exit_code,
            output.stdout.trim_end(),
            output.stderr.trim_end()
        ))
    }
}
