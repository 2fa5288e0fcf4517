//! Application bootstrap implementation.

use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::capability::CapabilityProvider;
use crate::cell::CellKey;
use crate::observation::ObservationProvider;
use crate::resolver::{self, Resolution};
use crate::session::{SessionController, SessionState};
use crate::store::{LookupStore, SqliteSource, StoreInfo, StoreSource};

/// Outcome of [`CellfixApp::locate`].
#[derive(Debug, Clone)]
pub struct LocateReport {
    /// Every state published during the attempt, in order.
    pub history: Vec<SessionState>,

    /// The terminal state.
    pub state: SessionState,
}

/// cellfix application with its own runtime.
///
/// Created from a non-async context (the CLI), it owns a Tokio runtime for
/// as long as it lives and blocks on it for each operation.
pub struct CellfixApp {
    config: AppConfig,
    source: Arc<dyn StoreSource>,
    runtime: Runtime,
}

impl CellfixApp {
    /// Start the application over the SQLite database named in `config`.
    ///
    /// The database is not opened here. A missing or invalid file surfaces
    /// when an operation first needs it.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be created.
    pub fn start_sync(config: AppConfig) -> Result<Self, AppError> {
        let source = Arc::new(SqliteSource::new(config.store_path.clone()));
        Self::start_sync_with_source(config, source)
    }

    /// Start the application over an arbitrary store source.
    pub fn start_sync_with_source(
        config: AppConfig,
        source: Arc<dyn StoreSource>,
    ) -> Result<Self, AppError> {
        let runtime = Runtime::new().map_err(|e| AppError::RuntimeCreation(e.to_string()))?;

        info!(
            source = %source.describe(),
            observation_timeout_ms = config.session.observation_timeout.as_millis() as u64,
            "Starting cellfix"
        );

        Ok(Self {
            config,
            source,
            runtime,
        })
    }

    /// Application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs one acquisition attempt to completion.
    ///
    /// Ctrl-C abandons the attempt: the session is torn down, releasing the
    /// database, and [`AppError::Interrupted`] is returned. A terminal
    /// `Failed` state is a normal outcome, not an error.
    pub fn locate(
        &self,
        capabilities: Arc<dyn CapabilityProvider>,
        observations: Arc<dyn ObservationProvider>,
    ) -> Result<LocateReport, AppError> {
        let mut controller = SessionController::new(
            capabilities,
            observations,
            Arc::clone(&self.source),
            self.config.session.clone(),
        );
        let mut updates = controller.subscribe();

        let outcome = self.runtime.block_on(async {
            tokio::select! {
                state = controller.run_attempt() => Some(state),
                _ = tokio::signal::ctrl_c() => None,
            }
        });
        controller.shutdown();

        let Some(state) = outcome else {
            warn!("Attempt interrupted, session torn down");
            return Err(AppError::Interrupted);
        };

        let mut history = Vec::new();
        while let Ok(update) = updates.try_recv() {
            history.push(update);
        }

        Ok(LocateReport { history, state })
    }

    /// Resolves `key` directly, bypassing capabilities and observation.
    pub fn lookup(&self, key: &CellKey) -> Result<Resolution, AppError> {
        let mut store = self.open_store()?;
        let resolution = resolver::resolve_key(store.as_ref(), key);
        store.close();
        Ok(resolution?)
    }

    /// Summary of the tower database.
    pub fn store_info(&self) -> Result<StoreInfo, AppError> {
        let mut store = self.open_store()?;
        let info = store.info();
        store.close();
        Ok(info?)
    }

    fn open_store(&self) -> Result<Box<dyn LookupStore>, AppError> {
        Ok(self.runtime.block_on(self.source.open())?)
    }
}
