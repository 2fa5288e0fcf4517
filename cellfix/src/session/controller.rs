//! Session controller implementation.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::config::{SessionConfig, STATE_CHANNEL_CAPACITY};
use super::state::{SessionEvent, SessionPhase, SessionState};
use crate::capability::{CapabilityGate, CapabilityProvider, CapabilityResult};
use crate::cell::CellIdentity;
use crate::observation::{ObservationProvider, ProviderError};
use crate::resolver::{self, Resolution, ResolveError};
use crate::store::{LookupStore, StoreError, StoreSource};

/// Drives acquisition attempts and owns the session's lookup store.
///
/// The controller issues one boundary call at a time and never overlaps
/// attempts: [`run_attempt`](Self::run_attempt) takes `&mut self`. The store
/// handle is held exclusively here and read sequentially, so it needs no lock.
///
/// # Teardown
///
/// [`shutdown`](Self::shutdown) closes the store. It also runs on drop, so
/// the store is released on every exit path, including an abandoned attempt
/// future and unwinding.
pub struct SessionController {
    gate: CapabilityGate,
    observations: Arc<dyn ObservationProvider>,
    source: Arc<dyn StoreSource>,
    config: SessionConfig,

    /// Opened on the first `Initializing`, kept across attempts.
    store: Option<Box<dyn LookupStore>>,

    /// Set by `shutdown`; the store is never reopened afterwards.
    torn_down: bool,

    state: SessionState,
    updates: broadcast::Sender<SessionState>,
}

impl SessionController {
    /// Creates a controller in `Idle`. Nothing is opened until the first
    /// attempt reaches `Initializing`.
    pub fn new(
        capabilities: Arc<dyn CapabilityProvider>,
        observations: Arc<dyn ObservationProvider>,
        source: Arc<dyn StoreSource>,
        config: SessionConfig,
    ) -> Self {
        let gate = CapabilityGate::new(capabilities).with_timeout(config.capability_timeout);
        let (updates, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);

        Self {
            gate,
            observations,
            source,
            config,
            store: None,
            torn_down: false,
            state: SessionState::default(),
            updates,
        }
    }

    /// The latest state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Subscribes to every state published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionState> {
        self.updates.subscribe()
    }

    /// Whether the session currently holds an open store.
    pub fn store_is_open(&self) -> bool {
        self.store.as_ref().is_some_and(|store| store.is_open())
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs one full attempt from `Idle` to a terminal phase and returns the
    /// final state.
    ///
    /// Any previous attempt, finished or abandoned, is superseded: the
    /// machine is reset to `Idle` under a new attempt id first. There is no
    /// automatic retry.
    pub async fn run_attempt(&mut self) -> SessionState {
        self.begin_attempt();

        if !self.request_capabilities().await {
            return self.finish();
        }

        if !self.initialize_store().await {
            return self.finish();
        }

        let event = self.resolve_observation().await;
        self.fire(event);
        self.finish()
    }

    /// Closes the store if open. Idempotent.
    ///
    /// Later attempts fail in `Initializing` with a store-unavailable failure
    /// instead of reopening.
    pub fn shutdown(&mut self) {
        if let Some(mut store) = self.store.take() {
            store.close();
            info!(attempt = self.state.attempt(), "Session store released");
        }
        if !self.torn_down {
            self.torn_down = true;
            debug!("Session torn down");
        }
    }

    fn begin_attempt(&mut self) {
        let attempt = self.state.attempt() + 1;
        if !matches!(self.state.phase(), SessionPhase::Idle) && !self.state.phase().is_terminal() {
            warn!(
                attempt,
                abandoned_phase = %self.state.phase(),
                "Superseding unfinished attempt"
            );
        }

        self.state = SessionState::new(attempt, self.state.phase().clone());
        info!(attempt, "Starting acquisition attempt");
        self.fire(SessionEvent::Reset);
        self.fire(SessionEvent::Start);
    }

    /// `RequestingCapabilities`. Returns whether the attempt continues.
    async fn request_capabilities(&mut self) -> bool {
        match self.gate.request_capabilities().await {
            CapabilityResult::Granted => {
                self.fire(SessionEvent::CapabilitiesGranted);
                true
            }
            CapabilityResult::Denied(denial) => {
                debug!(cause = ?denial.cause(), "Capabilities denied");
                self.fire(SessionEvent::CapabilitiesDenied(denial));
                false
            }
        }
    }

    /// `Initializing`. Returns whether the attempt continues.
    async fn initialize_store(&mut self) -> bool {
        if self.torn_down {
            self.fire(SessionEvent::StoreFailed(StoreError::Unavailable));
            return false;
        }

        if self.store_is_open() {
            debug!("Reusing lookup store opened by an earlier attempt");
            self.fire(SessionEvent::StoreReady);
            return true;
        }

        let source = Arc::clone(&self.source);
        debug!(source = %source.describe(), "Opening lookup store");
        match source.open().await {
            Ok(store) => {
                self.store = Some(store);
                self.fire(SessionEvent::StoreReady);
                true
            }
            Err(e) => {
                self.fire(SessionEvent::StoreFailed(e));
                false
            }
        }
    }

    /// `Resolving`: fetch, validate, look up. Returns the closing event.
    async fn resolve_observation(&mut self) -> SessionEvent {
        let limit = self.config.observation_timeout;
        let fetched = tokio::time::timeout(limit, self.observations.fetch_one()).await;

        let observation = match fetched {
            Ok(Ok(observation)) => observation,
            Ok(Err(e)) => return SessionEvent::ObservationFailed(e.to_string()),
            Err(_) => {
                return SessionEvent::ObservationFailed(ProviderError::TimedOut(limit).to_string())
            }
        };

        let identity = match CellIdentity::try_from(observation) {
            Ok(identity) => identity,
            Err(e) => {
                return SessionEvent::ObservationFailed(ProviderError::from(e).to_string());
            }
        };
        debug!(
            provider = self.observations.name(),
            cell = %identity,
            "Observed serving cell"
        );

        let Some(store) = self.store.as_deref() else {
            return SessionEvent::ResolveFailed(ResolveError::StoreUnavailable);
        };

        match resolver::resolve(store, &identity) {
            Ok(Resolution::Found(estimate)) => SessionEvent::Located(estimate),
            Ok(Resolution::NotFound) => SessionEvent::NotFound,
            Err(e) => SessionEvent::ResolveFailed(e),
        }
    }

    /// Applies `event` and publishes the resulting state.
    fn fire(&mut self, event: SessionEvent) {
        let attempt = self.state.attempt();

        let Some(next) = self.state.phase().on(&event) else {
            warn!(
                attempt,
                phase = %self.state.phase(),
                event = ?event,
                "Event does not apply in this phase, ignored"
            );
            return;
        };

        debug!(
            attempt,
            from = %self.state.phase(),
            to = %next,
            "Session transition"
        );

        self.state = SessionState::new(attempt, next);
        // No subscribers is fine; the snapshot stays readable via `state()`.
        let _ = self.updates.send(self.state.clone());
    }

    fn finish(&self) -> SessionState {
        match self.state.phase() {
            SessionPhase::Resolved(estimate) => info!(
                attempt = self.state.attempt(),
                latitude = estimate.latitude(),
                longitude = estimate.longitude(),
                accuracy = estimate.accuracy(),
                "Location resolved"
            ),
            SessionPhase::Failed(failure) if failure.kind().is_fault() => warn!(
                attempt = self.state.attempt(),
                kind = %failure.kind(),
                reason = failure.reason(),
                "Acquisition failed"
            ),
            SessionPhase::Failed(failure) => info!(
                attempt = self.state.attempt(),
                reason = failure.reason(),
                "No location for observed cell"
            ),
            other => warn!(
                attempt = self.state.attempt(),
                phase = %other,
                "Attempt ended in a non-terminal phase"
            ),
        }
        self.state.clone()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
