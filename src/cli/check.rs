use clap::Args;
use serde_json::json;

use crate::cli::GlobalArgs;
use crate::services::command_runner::SystemCommandRunner;
use crate::services::update_workflow::UpdateWorkflow;
use crate::utils::config::UpdaterConfig;
use crate::utils::error::{Result, UpdateError};

/// Compare the bundled version with the latest upstream release. Never writes.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

impl CheckCommand {
    pub async fn run(&self, global: &GlobalArgs, config: UpdaterConfig) -> Result<()> {
        let workflow = UpdateWorkflow::new(&global.root, config, SystemCommandRunner)?;
        let check = workflow.check().await?;
        let latest = &check.latest;

        if self.json {
            let response = json!({
                "current": check.current,
                "latest": latest.tag,
                "draft": latest.is_draft,
                "prerelease": latest.is_prerelease,
                "update_available": check.needs_update(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| UpdateError::Config(format!("JSON serialization error: {e}")))?
            );
            return Ok(());
        }

        let yes_no = |flag: bool| if flag { "yes" } else { "no" };
        println!("Bundled version:  {}", check.current);
        println!("Latest release:   {}", latest.tag);
        println!("Installable:      {}", yes_no(latest.is_installable()));
        println!("Update available: {}", yes_no(check.needs_update()));
        Ok(())
    }
}
