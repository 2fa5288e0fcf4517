//! Common types shared across CLI commands.

use cellfix::capability::Capability;
use clap::ValueEnum;

/// Capability selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CapabilityArg {
    /// Precise location
    FineLocation,
    /// Approximate location
    CoarseLocation,
    /// Telephony state (cell identifiers)
    ReadPhoneState,
}

impl From<CapabilityArg> for Capability {
    fn from(arg: CapabilityArg) -> Self {
        match arg {
            CapabilityArg::FineLocation => Capability::FineLocation,
            CapabilityArg::CoarseLocation => Capability::CoarseLocation,
            CapabilityArg::ReadPhoneState => Capability::ReadPhoneState,
        }
    }
}
