// CLI module for command-line interface

pub mod check;
pub mod publish;
pub mod update;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::utils::config::{ConfigParser, UpdaterConfig};
use crate::utils::error::{Result, UpdateError};

use self::check::CheckCommand;
use self::publish::PublishCommand;
use self::update::UpdateCommand;

/// Main CLI structure
#[derive(Debug, Parser)]
#[command(name = "vendor-sync")]
#[command(about = "Keep a vendored native library in sync with its upstream releases")]
#[command(long_about = r#"vendor-sync detects a new upstream release of a vendored library, installs
its single-header sources into the tree, validates the result with the
project's test suite and opens a pull request for the change.

Every run is idempotent: the update branch is named after the target version
(deps/<version>) and no second proposal is opened for a branch that already
has one.

Exit status is 0 when the run succeeded or had nothing to do, and 1 on any
failure.

Examples:
  vendor-sync check                         Compare bundled and latest versions
  vendor-sync update                        Install, test, commit and propose
  vendor-sync publish --from v7.0.1 --to v7.1.0
                                            Retry opening the proposal"#)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Project root holding the vendored files
    #[arg(long, global = true, env = "VENDOR_SYNC_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (default: <root>/vendor-sync.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL from the configuration
    #[arg(long, global = true, env = "VENDOR_SYNC_API_URL")]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Resolve the configuration with command-line overrides applied
    pub fn load_config(&self) -> Result<UpdaterConfig> {
        if !self.root.is_dir() {
            return Err(UpdateError::Config(format!(
                "Project root is not a directory: {}",
                self.root.display()
            )));
        }

        let mut config = ConfigParser::load(&self.root, self.config.as_deref())?;
        if let Some(api_url) = &self.api_url {
            config.api_url.clone_from(api_url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Proposal credential from the configured environment variable
    pub fn credential(config: &UpdaterConfig) -> Option<String> {
        std::env::var(&config.credential_env).ok()
    }
}

/// All available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install the latest upstream release and open a proposal for it
    #[command(long_about = r#"Run the full update pipeline:

  1. fetch the latest upstream release (drafts and pre-releases are refused)
  2. download the release archive and patch the vendored files
  3. run the test command against the patched tree
  4. confirm that tracked files changed
  5. commit them on branch deps/<version>
  6. open a proposal unless one is already open for that branch

The proposal credential is read from the configured environment variable
(SIMDUTF_GH_ACTIONS by default) and is only needed for step 6."#)]
    Update(UpdateCommand),

    /// Compare the bundled version with the latest upstream release
    Check(CheckCommand),

    /// Retry opening the proposal for an already committed update branch
    Publish(PublishCommand),
}

/// CLI command dispatcher
pub struct CliDispatcher;

impl CliDispatcher {
    /// Execute a CLI command
    pub async fn execute(cli: Cli) -> Result<()> {
        let config = cli.global.load_config()?;
        match cli.command {
            Commands::Update(cmd) => cmd.run(&cli.global, config).await,
            Commands::Check(cmd) => cmd.run(&cli.global, config).await,
            Commands::Publish(cmd) => cmd.run(&cli.global, config).await,
        }
    }
}
