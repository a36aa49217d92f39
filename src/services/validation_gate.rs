use std::path::{Path, PathBuf};

use tracing::info;

use crate::services::command_runner::{CommandRunner, Invocation};
use crate::utils::error::{Result, UpdateError};

/// Runs the project's test command against the patched tree
#[derive(Debug, Clone)]
pub struct ValidationGate<R> {
    runner: R,
    root: PathBuf,
    command: Vec<String>,
}

impl<R: CommandRunner> ValidationGate<R> {
    pub fn new(runner: R, root: &Path, command: Vec<String>) -> Self {
        Self {
            runner,
            root: root.to_path_buf(),
            command,
        }
    }

    /// Run the tests to completion with output streamed to the terminal.
    /// No timeout is imposed; the test runner's own limits apply.
    pub async fn validate(&self) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| UpdateError::Config("Test command is empty".to_string()))?;

        let invocation = Invocation::new(program.clone(), &self.root)
            .args(args.iter().cloned())
            .inherit_output();
        info!("validating with `{}`", invocation.command_line());

        let output = self.runner.run(&invocation).await.map_err(|e| {
            UpdateError::Validation(format!(
                "failed to run `{}`: {}",
                invocation.command_line(),
                e
            ))
        })?;

        if !output.success() {
            return Err(UpdateError::Validation(format!(
                "`{}` exited with status {} (see test output above)",
                invocation.command_line(),
                output.exit_code
            )));
        }

        info!("validation passed");
        Ok(())
    }
}
