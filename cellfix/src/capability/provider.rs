//! Capability provider abstraction for the operating system boundary.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::BoxFuture;

/// A runtime permission the pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Precise location access.
    FineLocation,
    /// Approximate location access.
    CoarseLocation,
    /// Access to telephony state, including the cell list.
    ReadPhoneState,
}

/// The fixed set of capabilities requested before every attempt.
pub const REQUIRED_CAPABILITIES: [Capability; 3] = [
    Capability::FineLocation,
    Capability::CoarseLocation,
    Capability::ReadPhoneState,
];

impl Capability {
    /// Short name used in configuration and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::FineLocation => "fine-location",
            Capability::CoarseLocation => "coarse-location",
            Capability::ReadPhoneState => "read-phone-state",
        }
    }

    /// The Android manifest permission backing this capability.
    pub fn android_permission(&self) -> &'static str {
        match self {
            Capability::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Capability::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
            Capability::ReadPhoneState => "android.permission.READ_PHONE_STATE",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        REQUIRED_CAPABILITIES
            .into_iter()
            .find(|c| c.name() == s || c.android_permission() == s)
            .ok_or_else(|| CapabilityError::UnknownCapability(s.to_string()))
    }
}

/// Errors raised by a capability provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    /// The platform failed to process the request.
    #[error("capability request failed: {0}")]
    RequestFailed(String),

    /// The capability name is not one this crate knows about.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),
}

/// Grants or refuses named capabilities.
///
/// Implementations may suspend for as long as the platform consent flow
/// takes. Capabilities missing from the returned map count as refused.
pub trait CapabilityProvider: Send + Sync {
    /// Requests every capability in `capabilities`, returning a per-capability
    /// grant flag.
    fn request_all<'a>(
        &'a self,
        capabilities: &'a [Capability],
    ) -> BoxFuture<'a, Result<HashMap<Capability, bool>, CapabilityError>>;
}

/// Provider with a fixed answer, used by the CLI and for headless runs.
///
/// Every capability is granted unless it appears in the refused set.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilityProvider {
    refused: HashSet<Capability>,
}

impl StaticCapabilityProvider {
    /// Provider that grants everything.
    pub fn granting_all() -> Self {
        Self::default()
    }

    /// Provider that refuses the given capabilities.
    pub fn refusing(refused: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            refused: refused.into_iter().collect(),
        }
    }
}

impl CapabilityProvider for StaticCapabilityProvider {
    fn request_all<'a>(
        &'a self,
        capabilities: &'a [Capability],
    ) -> BoxFuture<'a, Result<HashMap<Capability, bool>, CapabilityError>> {
        Box::pin(async move {
            Ok(capabilities
                .iter()
                .map(|c| (*c, !self.refused.contains(c)))
                .collect())
        })
    }
}
