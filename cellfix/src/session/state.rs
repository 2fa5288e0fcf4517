//! Session state machine.
//!
//! ```text
//! Idle --Start--> RequestingCapabilities
//! RequestingCapabilities --CapabilitiesGranted--> Initializing
//! RequestingCapabilities --CapabilitiesDenied--> Failed(PermissionDenied)
//! Initializing --StoreReady--> Resolving
//! Initializing --StoreFailed--> Failed(StoreOpenFailed | StoreUnavailable)
//! Resolving --Located--> Resolved
//! Resolving --NotFound--> Failed(NotFound)
//! Resolving --ObservationFailed--> Failed(ProviderError)
//! Resolving --ResolveFailed--> Failed(StoreUnavailable | QueryFailed)
//! any --Reset--> Idle
//! ```
//!
//! Every other (phase, event) pair is a no-op: the phase is left unchanged.
//! [`SessionPhase::on`] is pure and total, so the controller is the only place
//! with side effects.

use std::fmt;

use crate::capability::Denial;
use crate::location::LocationEstimate;
use crate::resolver::ResolveError;
use crate::store::StoreError;

/// Reason reported when the key has no record.
pub const NOT_FOUND_REASON: &str = "not found";

/// Class of a failed attempt.
///
/// [`FailureKind::NotFound`] is not a fault; it is kept apart so logs and
/// tests can tell it from real errors even though users see the same
/// "no location" result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    PermissionDenied,
    ProviderError,
    StoreOpenFailed,
    StoreUnavailable,
    QueryFailed,
    NotFound,
}

impl FailureKind {
    /// Whether this kind represents a fault rather than a clean miss.
    pub fn is_fault(&self) -> bool {
        !matches!(self, FailureKind::NotFound)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::PermissionDenied => "permission denied",
            FailureKind::ProviderError => "provider error",
            FailureKind::StoreOpenFailed => "store open failed",
            FailureKind::StoreUnavailable => "store unavailable",
            FailureKind::QueryFailed => "query failed",
            FailureKind::NotFound => "not found",
        };
        f.write_str(name)
    }
}

/// Why an attempt ended in [`SessionPhase::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: FailureKind,
    reason: String,
}

impl Failure {
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(FailureKind::NotFound, NOT_FOUND_REASON)
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Human-readable reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl From<&Denial> for Failure {
    fn from(denial: &Denial) -> Self {
        Failure::new(FailureKind::PermissionDenied, denial.reason())
    }
}

impl From<&StoreError> for Failure {
    fn from(e: &StoreError) -> Self {
        let kind = match e {
            StoreError::OpenFailed { .. } => FailureKind::StoreOpenFailed,
            StoreError::Unavailable => FailureKind::StoreUnavailable,
            StoreError::QueryFailed(_) => FailureKind::QueryFailed,
        };
        Failure::new(kind, e.to_string())
    }
}

impl From<&ResolveError> for Failure {
    fn from(e: &ResolveError) -> Self {
        let kind = match e {
            ResolveError::StoreUnavailable => FailureKind::StoreUnavailable,
            ResolveError::QueryFailed(_) => FailureKind::QueryFailed,
        };
        Failure::new(kind, e.to_string())
    }
}

/// Input to the state machine.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Begin the attempt.
    Start,
    CapabilitiesGranted,
    CapabilitiesDenied(Denial),
    /// The store is open (freshly, or still open from an earlier attempt).
    StoreReady,
    StoreFailed(StoreError),
    Located(LocationEstimate),
    NotFound,
    ObservationFailed(String),
    ResolveFailed(ResolveError),
    /// Abandon whatever is in progress and return to `Idle`.
    Reset,
}

/// Phase of one acquisition attempt.
///
/// Terminal phases carry their outcome, so an estimate and a failure can
/// never be present together.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Idle,
    RequestingCapabilities,
    Initializing,
    Resolving,
    Resolved(LocationEstimate),
    Failed(Failure),
}

impl SessionPhase {
    /// Next phase for `event`, or `None` when the event does not apply here.
    pub fn on(&self, event: &SessionEvent) -> Option<SessionPhase> {
        use SessionEvent as E;
        use SessionPhase as P;

        match (self, event) {
            (_, E::Reset) => Some(P::Idle),

            (P::Idle, E::Start) => Some(P::RequestingCapabilities),

            (P::RequestingCapabilities, E::CapabilitiesGranted) => Some(P::Initializing),
            (P::RequestingCapabilities, E::CapabilitiesDenied(denial)) => {
                Some(P::Failed(denial.into()))
            }

            (P::Initializing, E::StoreReady) => Some(P::Resolving),
            (P::Initializing, E::StoreFailed(e)) => Some(P::Failed(e.into())),

            (P::Resolving, E::Located(estimate)) => Some(P::Resolved(*estimate)),
            (P::Resolving, E::NotFound) => Some(P::Failed(Failure::not_found())),
            (P::Resolving, E::ObservationFailed(reason)) => Some(P::Failed(Failure::new(
                FailureKind::ProviderError,
                reason.clone(),
            ))),
            (P::Resolving, E::ResolveFailed(e)) => Some(P::Failed(e.into())),

            _ => None,
        }
    }

    /// Whether the attempt has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Resolved(_) | SessionPhase::Failed(_))
    }

    /// Phase name without payload.
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::RequestingCapabilities => "RequestingCapabilities",
            SessionPhase::Initializing => "Initializing",
            SessionPhase::Resolving => "Resolving",
            SessionPhase::Resolved(_) => "Resolved",
            SessionPhase::Failed(_) => "Failed",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Failed(failure) => write!(f, "Failed({})", failure),
            other => f.write_str(other.name()),
        }
    }
}

/// Snapshot published after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    attempt: u64,
    phase: SessionPhase,
}

impl SessionState {
    pub(crate) fn new(attempt: u64, phase: SessionPhase) -> Self {
        Self { attempt, phase }
    }

    /// Attempt the snapshot belongs to. Observers discard snapshots whose
    /// attempt is older than the newest they have seen.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// The resolved estimate, only in `Resolved`.
    pub fn estimate(&self) -> Option<&LocationEstimate> {
        match &self.phase {
            SessionPhase::Resolved(estimate) => Some(estimate),
            _ => None,
        }
    }

    /// The failure, only in `Failed`.
    pub fn failure(&self) -> Option<&Failure> {
        match &self.phase {
            SessionPhase::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(0, SessionPhase::Idle)
    }
}
