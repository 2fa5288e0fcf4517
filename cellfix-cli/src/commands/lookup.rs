//! Lookup command - query the tower database for one cell key.

use cellfix::cell::CellKey;
use cellfix::resolver::Resolution;

use crate::error::CliError;
use crate::runner::CliRunner;

pub fn run(runner: &CliRunner, key: CellKey) -> Result<(), CliError> {
    runner.log_startup("lookup");

    let app = runner.start_app(runner.config().clone())?;
    match app.lookup(&key)? {
        Resolution::Found(estimate) => {
            println!("Cell:      {}", key);
            println!("{}", estimate);
            Ok(())
        }
        Resolution::NotFound => Err(CliError::NotFound(key)),
    }
}
