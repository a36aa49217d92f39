use clap::Args;
use serde_json::json;

use crate::cli::GlobalArgs;
use crate::services::command_runner::SystemCommandRunner;
use crate::services::update_workflow::{RunOutcome, UpdateWorkflow};
use crate::utils::config::UpdaterConfig;
use crate::utils::error::{Result, UpdateError};

/// Run the full update pipeline
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl UpdateCommand {
    pub async fn run(&self, global: &GlobalArgs, config: UpdaterConfig) -> Result<()> {
        let credential = GlobalArgs::credential(&config);
        let mut workflow = UpdateWorkflow::new(&global.root, config, SystemCommandRunner)?;
        let outcome = workflow.run(credential).await?;
        print_outcome(&outcome, self.json)
    }
}

/// Print a run outcome for the operator
pub fn print_outcome(outcome: &RunOutcome, as_json: bool) -> Result<()> {
    if as_json {
        let value = match outcome {
            RunOutcome::UpToDate { current } => json!({
                "status": "up_to_date",
                "current": current,
            }),
            RunOutcome::DowngradeRefused { current, latest } => json!({
                "status": "downgrade_refused",
                "current": current,
                "latest": latest,
            }),
            RunOutcome::Published { from, to, branch, pull_request } => json!({
                "status": "published",
                "from": from,
                "to": to,
                "branch": branch,
                "number": pull_request.number,
                "url": pull_request.html_url,
            }),
            RunOutcome::AlreadyProposed { from, to, branch, pull_request } => json!({
                "status": "already_proposed",
                "from": from,
                "to": to,
                "branch": branch,
                "number": pull_request.number,
                "url": pull_request.html_url,
            }),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&value)
                .map_err(|e| UpdateError::Config(format!("JSON serialization error: {e}")))?
        );
        return Ok(());
    }

    match outcome {
        RunOutcome::UpToDate { current } => {
            println!("✓ Bundled version {current} is already up to date");
        }
        RunOutcome::DowngradeRefused { current, latest } => {
            println!("Latest release {latest} is older than bundled {current}; nothing to do");
        }
        RunOutcome::Published { from, to, branch, pull_request } => {
            println!("✓ Updated {from} -> {to} on branch {branch}");
            println!("✓ Opened proposal #{}: {}", pull_request.number, pull_request.html_url);
        }
        RunOutcome::AlreadyProposed { from, to, branch, pull_request } => {
            println!("✓ Updated {from} -> {to} on branch {branch}");
            println!(
                "Proposal #{} is already open: {}",
                pull_request.number, pull_request.html_url
            );
        }
    }
    Ok(())
}
