// vendor-sync - main CLI entry point

use clap::Parser;
use std::process;
use vendor_sync::cli::{Cli, CliDispatcher};
use vendor_sync::utils::error::UserError;
use vendor_sync::utils::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let result = CliDispatcher::execute(cli).await;

    if let Err(err) = result {
        let user_error = UserError::from_update_error(&err);
        user_error.print();
        process::exit(user_error.exit_code);
    }
}
