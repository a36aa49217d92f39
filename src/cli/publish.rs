use clap::Args;

use crate::cli::update::print_outcome;
use crate::cli::GlobalArgs;
use crate::models::version::Version;
use crate::services::command_runner::SystemCommandRunner;
use crate::services::update_workflow::UpdateWorkflow;
use crate::utils::config::UpdaterConfig;
use crate::utils::error::Result;

/// Open the proposal for an update branch committed by an earlier run
#[derive(Debug, Args)]
pub struct PublishCommand {
    /// Version the branch updates from
    #[arg(long)]
    pub from: Version,

    /// Version the branch updates to (branch deps/<to>)
    #[arg(long)]
    pub to: Version,

    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl PublishCommand {
    pub async fn run(&self, global: &GlobalArgs, config: UpdaterConfig) -> Result<()> {
        let credential = GlobalArgs::credential(&config);
        let mut workflow = UpdateWorkflow::new(&global.root, config, SystemCommandRunner)?;
        let outcome = workflow.retry_publish(&self.from, &self.to, credential).await?;
        print_outcome(&outcome, self.json)
    }
}
