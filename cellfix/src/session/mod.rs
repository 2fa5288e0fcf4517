//! Acquisition session.
//!
//! The [`SessionController`] runs one acquisition attempt at a time through
//! the state machine in [`state`]:
//!
//! ```text
//! Idle → RequestingCapabilities → Initializing → Resolving → Resolved
//!                 │                     │             │
//!                 └─────────────────────┴─────────────┴──────→ Failed
//! ```
//!
//! Every transition is published as a [`SessionState`] on a broadcast
//! channel. The lookup store is opened in the first `Initializing` phase of
//! the session, reused by later attempts, and closed by
//! [`SessionController::shutdown`] or when the controller is dropped.
//!
//! # Example
//!
//! ```ignore
//! use cellfix::session::{SessionConfig, SessionController};
//!
//! let mut session = SessionController::new(capabilities, observations, source, SessionConfig::default());
//! let mut updates = session.subscribe();
//!
//! let state = session.run_attempt().await;
//! if let Some(estimate) = state.estimate() {
//!     println!("{}", estimate);
//! }
//!
//! session.shutdown();
//! ```

mod config;
mod controller;
pub mod state;

pub use config::{SessionConfig, DEFAULT_OBSERVATION_TIMEOUT_SECS, STATE_CHANNEL_CAPACITY};
pub use controller::SessionController;
pub use state::{
    Failure, FailureKind, SessionEvent, SessionPhase, SessionState, NOT_FOUND_REASON,
};
