//! Tower database commands.

use clap::Subcommand;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Store subcommands.
#[derive(Debug, Subcommand)]
pub enum StoreAction {
    /// Open the tower database and show a summary
    Info,
}

pub fn run(runner: &CliRunner, action: StoreAction) -> Result<(), CliError> {
    match action {
        StoreAction::Info => {
            runner.log_startup("store info");
            let app = runner.start_app(runner.config().clone())?;
            let info = app.store_info()?;

            println!("Tower database: {}", app.config().store_path.display());
            println!("  Records: {}", info.records);
            Ok(())
        }
    }
}
