//! cellfix CLI - position from the serving cell tower.
//!
//! This binary provides a command-line interface to the cellfix library.

use std::path::PathBuf;
use std::process::ExitCode;

use cellfix::cell::CellKey;
use clap::{Parser, Subcommand};

mod commands;
mod error;
mod runner;

use commands::common::CapabilityArg;
use commands::config::ConfigCommands;
use commands::locate::LocateArgs;
use commands::store::StoreAction;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "cellfix", version, about = "Offline position from the serving cell tower")]
struct Cli {
    /// Tower database (overrides store.path from config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Also print logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one acquisition attempt and print the estimate
    Locate {
        /// Serving cell id
        #[arg(long, allow_hyphen_values = true)]
        cell_id: Option<i64>,

        /// Location area code
        #[arg(long, allow_hyphen_values = true)]
        lac: Option<i64>,

        /// Mobile country code
        #[arg(long, allow_hyphen_values = true)]
        mcc: Option<i64>,

        /// Mobile network code
        #[arg(long, allow_hyphen_values = true)]
        mnc: Option<i64>,

        /// Signal strength in dBm
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        signal: i32,

        /// Read the observation from a JSON file instead of flags
        #[arg(long, value_name = "FILE", conflicts_with_all = ["cell_id", "lac", "mcc", "mnc"])]
        observation: Option<PathBuf>,

        /// Refuse a capability (repeatable)
        #[arg(long, value_enum)]
        deny: Vec<CapabilityArg>,

        /// Seconds to wait for an observation (overrides session.observation_timeout)
        #[arg(long)]
        timeout: Option<u64>,

        /// Print every published state before the result
        #[arg(long)]
        history: bool,
    },

    /// Look up a cell key directly, without a session
    Lookup {
        #[arg(long)]
        cell_id: u32,

        #[arg(long)]
        lac: u32,

        #[arg(long, value_parser = clap::value_parser!(u16).range(..=999))]
        mcc: u16,

        #[arg(long, value_parser = clap::value_parser!(u16).range(..=999))]
        mnc: u16,
    },

    /// Tower database commands
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands edit the file itself, so they run before it is loaded.
    let runner = || CliRunner::new(cli.db.clone(), cli.verbose);

    match cli.command {
        Commands::Config { command } => commands::config::run(command),
        Commands::Locate {
            cell_id,
            lac,
            mcc,
            mnc,
            signal,
            observation,
            deny,
            timeout,
            history,
        } => commands::locate::run(
            &runner()?,
            LocateArgs {
                cell_id,
                lac,
                mcc,
                mnc,
                signal,
                observation,
                deny,
                timeout,
                history,
            },
        ),
        Commands::Lookup {
            cell_id,
            lac,
            mcc,
            mnc,
        } => commands::lookup::run(&runner()?, CellKey::new(cell_id, lac, mcc, mnc)),
        Commands::Store { action } => commands::store::run(&runner()?, action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_locate_with_negative_signal() {
        let cli = Cli::try_parse_from([
            "cellfix", "locate", "--cell-id", "100", "--lac", "200", "--mcc", "310", "--mnc",
            "410", "--signal", "-70", "--deny", "read-phone-state",
        ])
        .unwrap();

        match cli.command {
            Commands::Locate { signal, deny, .. } => {
                assert_eq!(signal, -70);
                assert_eq!(deny, vec![CapabilityArg::ReadPhoneState]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_lookup_rejects_four_digit_mcc() {
        let result = Cli::try_parse_from([
            "cellfix", "lookup", "--cell-id", "1", "--lac", "2", "--mcc", "1000", "--mnc", "1",
        ]);
        assert!(result.is_err());
    }
}
