//! All-or-nothing capability check.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::provider::{Capability, CapabilityProvider, REQUIRED_CAPABILITIES};

/// Reason reported for every denial, whatever its cause.
pub const PERMISSION_DENIED_REASON: &str = "permission request failed";

/// Why the gate denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialCause {
    /// The provider answered but refused these capabilities.
    NotGranted(Vec<Capability>),
    /// The provider itself failed.
    RequestFailed(String),
    /// The provider did not answer within the configured bound.
    TimedOut(Duration),
}

/// A denied capability request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    cause: DenialCause,
}

impl Denial {
    pub fn new(cause: DenialCause) -> Self {
        Self { cause }
    }

    /// Human-readable reason, identical for every cause.
    pub fn reason(&self) -> &'static str {
        PERMISSION_DENIED_REASON
    }

    /// The detail behind the denial, for logs and tests.
    pub fn cause(&self) -> &DenialCause {
        &self.cause
    }
}

/// Outcome of a capability request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityResult {
    Granted,
    Denied(Denial),
}

impl CapabilityResult {
    pub fn is_granted(&self) -> bool {
        matches!(self, CapabilityResult::Granted)
    }
}

/// Requests [`REQUIRED_CAPABILITIES`] and folds the answer into a single
/// granted/denied result.
#[derive(Clone)]
pub struct CapabilityGate {
    provider: Arc<dyn CapabilityProvider>,
    timeout: Option<Duration>,
}

impl CapabilityGate {
    /// Creates a gate with no bound on how long the provider may take.
    pub fn new(provider: Arc<dyn CapabilityProvider>) -> Self {
        Self {
            provider,
            timeout: None,
        }
    }

    /// Bounds the provider call. An expired bound is a denial.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Requests every required capability.
    ///
    /// Returns [`CapabilityResult::Granted`] only if the provider granted all
    /// of them. Provider errors are folded into a denial.
    pub async fn request_capabilities(&self) -> CapabilityResult {
        let request = self.provider.request_all(&REQUIRED_CAPABILITIES);

        let answer = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(answer) => answer,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "Capability request timed out");
                    return CapabilityResult::Denied(Denial::new(DenialCause::TimedOut(limit)));
                }
            },
            None => request.await,
        };

        let grants = match answer {
            Ok(grants) => grants,
            Err(e) => {
                warn!(error = %e, "Capability request failed");
                return CapabilityResult::Denied(Denial::new(DenialCause::RequestFailed(
                    e.to_string(),
                )));
            }
        };

        let refused: Vec<Capability> = REQUIRED_CAPABILITIES
            .into_iter()
            .filter(|c| !grants.get(c).copied().unwrap_or(false))
            .collect();

        if refused.is_empty() {
            debug!("All capabilities granted");
            CapabilityResult::Granted
        } else {
            let names: Vec<&str> = refused.iter().map(Capability::name).collect();
            warn!(refused = ?names, "Required capabilities not granted");
            CapabilityResult::Denied(Denial::new(DenialCause::NotGranted(refused)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilityError, StaticCapabilityProvider};
    use crate::BoxFuture;
    use std::collections::HashMap;

    struct FailingProvider;

    impl CapabilityProvider for FailingProvider {
        fn request_all<'a>(
            &'a self,
            _capabilities: &'a [Capability],
        ) -> BoxFuture<'a, Result<HashMap<Capability, bool>, CapabilityError>> {
            Box::pin(async { Err(CapabilityError::RequestFailed("binder died".to_string())) })
        }
    }

    /// Answers with only the fine-location entry.
    struct PartialMapProvider;

    impl CapabilityProvider for PartialMapProvider {
        fn request_all<'a>(
            &'a self,
            _capabilities: &'a [Capability],
        ) -> BoxFuture<'a, Result<HashMap<Capability, bool>, CapabilityError>> {
            Box::pin(async { Ok(HashMap::from([(Capability::FineLocation, true)])) })
        }
    }

    struct HangingProvider;

    impl CapabilityProvider for HangingProvider {
        fn request_all<'a>(
            &'a self,
            _capabilities: &'a [Capability],
        ) -> BoxFuture<'a, Result<HashMap<Capability, bool>, CapabilityError>> {
            Box::pin(std::future::pending::<
                Result<HashMap<Capability, bool>, CapabilityError>,
            >())
        }
    }

    #[tokio::test]
    async fn test_all_granted() {
        let gate = CapabilityGate::new(Arc::new(StaticCapabilityProvider::granting_all()));
        assert_eq!(gate.request_capabilities().await, CapabilityResult::Granted);
    }

    #[tokio::test]
    async fn test_partial_grant_is_denial() {
        let gate = CapabilityGate::new(Arc::new(StaticCapabilityProvider::refusing([
            Capability::ReadPhoneState,
        ])));

        match gate.request_capabilities().await {
            CapabilityResult::Denied(denial) => {
                assert_eq!(denial.reason(), PERMISSION_DENIED_REASON);
                assert_eq!(
                    denial.cause(),
                    &DenialCause::NotGranted(vec![Capability::ReadPhoneState])
                );
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_entries_count_as_refused() {
        let gate = CapabilityGate::new(Arc::new(PartialMapProvider));

        match gate.request_capabilities().await {
            CapabilityResult::Denied(denial) => assert_eq!(
                denial.cause(),
                &DenialCause::NotGranted(vec![
                    Capability::CoarseLocation,
                    Capability::ReadPhoneState
                ])
            ),
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_provider_error_folds_into_denial() {
        let gate = CapabilityGate::new(Arc::new(FailingProvider));

        match gate.request_capabilities().await {
            CapabilityResult::Denied(denial) => {
                assert_eq!(denial.reason(), "permission request failed");
                assert!(matches!(denial.cause(), DenialCause::RequestFailed(_)));
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_denial() {
        let gate = CapabilityGate::new(Arc::new(HangingProvider))
            .with_timeout(Some(Duration::from_millis(20)));

        match gate.request_capabilities().await {
            CapabilityResult::Denied(denial) => {
                assert!(matches!(denial.cause(), DenialCause::TimedOut(_)))
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }
}
