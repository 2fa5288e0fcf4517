//! Session configuration.

use std::time::Duration;

/// Default bound on a single observation fetch (in seconds).
///
/// The radio layer has no timeout of its own, so an unanswered fetch would
/// otherwise hold the attempt in `Resolving` forever.
pub const DEFAULT_OBSERVATION_TIMEOUT_SECS: u64 = 10;

/// Capacity of the state broadcast channel.
pub const STATE_CHANNEL_CAPACITY: usize = 16;

/// Configuration for a [`SessionController`](super::SessionController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on one observation fetch.
    pub observation_timeout: Duration,

    /// Upper bound on the capability request. `None` waits for as long as the
    /// user takes to answer the consent dialog.
    pub capability_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            observation_timeout: Duration::from_secs(DEFAULT_OBSERVATION_TIMEOUT_SECS),
            capability_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Set the observation fetch bound.
    pub fn with_observation_timeout(mut self, timeout: Duration) -> Self {
        self.observation_timeout = timeout;
        self
    }

    /// Set the capability request bound.
    pub fn with_capability_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.capability_timeout = timeout;
        self
    }
}
