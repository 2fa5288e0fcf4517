//! Locate command - run one acquisition attempt.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cellfix::capability::{Capability, StaticCapabilityProvider};
use cellfix::cell::CellObservation;
use cellfix::observation::{FileObservationProvider, FixedObservationProvider, ObservationProvider};
use cellfix::session::{SessionPhase, SessionState};

use super::common::CapabilityArg;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the locate command.
pub struct LocateArgs {
    pub cell_id: Option<i64>,
    pub lac: Option<i64>,
    pub mcc: Option<i64>,
    pub mnc: Option<i64>,
    pub signal: i32,
    pub observation: Option<PathBuf>,
    pub deny: Vec<CapabilityArg>,
    pub timeout: Option<u64>,
    pub history: bool,
}

/// Run the locate command.
pub fn run(runner: &CliRunner, args: LocateArgs) -> Result<(), CliError> {
    runner.log_startup("locate");

    let observations = observation_provider(&args)?;
    let capabilities = Arc::new(StaticCapabilityProvider::refusing(
        args.deny.iter().copied().map(Capability::from),
    ));

    let mut config = runner.config().clone();
    if let Some(secs) = args.timeout {
        if secs == 0 {
            return Err(CliError::Usage("--timeout must be at least 1 second".to_string()));
        }
        config = config.with_observation_timeout(Duration::from_secs(secs));
    }

    let app = runner.start_app(config)?;
    let report = app.locate(capabilities, observations)?;

    if args.history {
        for state in &report.history {
            println!("{}", describe(state));
        }
        println!();
    }

    match report.state.phase() {
        SessionPhase::Resolved(estimate) => {
            println!("{}", estimate);
            Ok(())
        }
        SessionPhase::Failed(failure) => Err(CliError::LocateFailed(failure.clone())),
        other => Err(CliError::Usage(format!(
            "attempt stopped in non-terminal phase {}",
            other
        ))),
    }
}

/// Observation source: `--observation` file, or the four identifier flags.
fn observation_provider(args: &LocateArgs) -> Result<Arc<dyn ObservationProvider>, CliError> {
    if let Some(path) = &args.observation {
        return Ok(Arc::new(FileObservationProvider::new(path.clone())));
    }

    match (args.cell_id, args.lac, args.mcc, args.mnc) {
        (Some(cell_id), Some(lac), Some(mcc), Some(mnc)) => {
            let observation = CellObservation::new(cell_id, lac, mcc, mnc, args.signal);
            Ok(Arc::new(FixedObservationProvider::new(observation)))
        }
        _ => Err(CliError::Usage(
            "give --cell-id, --lac, --mcc and --mnc, or --observation <FILE>".to_string(),
        )),
    }
}

fn describe(state: &SessionState) -> String {
    format!("[attempt {}] {}", state.attempt(), state.phase().name())
}
